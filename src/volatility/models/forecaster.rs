//! Dated multi-step volatility forecasts from a fitted model.
use crate::volatility::{
    core::{forecasts::forecast_recursion, returns::ReturnSeries},
    errors::{GarchError, GarchResult},
    models::fitted::{FitWarning, FittedModel},
};
use chrono::{Days, NaiveDate};
use ndarray::{Array1, s};
use serde::Serialize;
use tracing::debug;

/// Default upper limit on the forecast horizon.
pub const DEFAULT_MAX_HORIZON: usize = 30;

/// One forecast step. `volatility = sqrt(variance)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub step: usize,
    pub date: NaiveDate,
    pub variance: f64,
    pub volatility: f64,
}

/// Forecast path plus the fit warnings it inherits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSeries {
    pub points: Vec<ForecastPoint>,
    pub warnings: Vec<FitWarning>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Horizon-checked front end to [`forecast_recursion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forecaster {
    pub max_horizon: usize,
}

impl Forecaster {
    pub fn new(max_horizon: usize) -> Forecaster {
        Forecaster { max_horizon }
    }

    /// Undated variance path `σ̂²_{T+1}, …, σ̂²_{T+h}` in the model's units.
    ///
    /// The recursion is seeded with the last `p` squared residuals and the
    /// last `q` conditional variances of the fit, and clamped by the fit's
    /// variance guards.
    ///
    /// # Errors
    /// - `InvalidHorizon` unless `1 ≤ horizon ≤ max_horizon`.
    pub fn forecast_path(&self, model: &FittedModel, horizon: usize) -> GarchResult<Array1<f64>> {
        self.check_horizon(horizon)?;
        let p = model.spec.p;
        let q = model.spec.q;
        let n = model.residuals.len();
        if n < p || model.conditional_variance.len() < q {
            return Err(GarchError::InsufficientData {
                needed: p.max(q),
                found: n,
                context: "forecast lags",
            });
        }
        let eps2_lags = model.residuals.slice(s![n - p..]).mapv(|e| e * e);
        let m = model.conditional_variance.len();
        let var_lags = model.conditional_variance.slice(s![m - q..]);
        forecast_recursion(&model.params, eps2_lags.view(), var_lags, horizon, &model.guards)
    }

    /// forecast — dated volatility forecast.
    ///
    /// Parameters
    /// ----------
    /// - `model`: `&FittedModel`
    ///   Fit whose final state seeds the recursion.
    /// - `returns`: `&ReturnSeries`
    ///   The series the model was fitted on; only its last date is used.
    /// - `horizon`: `usize`
    ///   Number of steps, in `1..=max_horizon`.
    ///
    /// Returns
    /// -------
    /// `GarchResult<ForecastSeries>`
    ///   Step `h` is dated `h` calendar days after the last return. The fit's
    ///   warnings are copied onto the series.
    ///
    /// Errors
    /// ------
    /// - `InvalidHorizon` for a horizon outside `1..=max_horizon`.
    /// - `InvalidParameters` when `returns` is not the fitted series or a
    ///   forecast date overflows the calendar.
    pub fn forecast(
        &self, model: &FittedModel, returns: &ReturnSeries, horizon: usize,
    ) -> GarchResult<ForecastSeries> {
        if returns.len() != model.n_obs {
            return Err(GarchError::InvalidParameters {
                reason: format!(
                    "model was fitted on {} returns; got a series of {}",
                    model.n_obs,
                    returns.len()
                ),
            });
        }
        let variance = self.forecast_path(model, horizon)?;
        let last = returns.last_date().ok_or(GarchError::InsufficientData {
            needed: 1,
            found: 0,
            context: "forecast dates",
        })?;
        let points = variance
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let step = i + 1;
                let date = last.checked_add_days(Days::new(step as u64)).ok_or_else(|| {
                    GarchError::InvalidParameters {
                        reason: format!("forecast date {step} days after {last} is out of range"),
                    }
                })?;
                Ok(ForecastPoint { step, date, variance: v, volatility: v.sqrt() })
            })
            .collect::<GarchResult<Vec<_>>>()?;
        debug!(horizon, first = variance[0], last = variance[horizon - 1], "forecast complete");
        Ok(ForecastSeries { points, warnings: model.warnings.clone() })
    }

    fn check_horizon(&self, horizon: usize) -> GarchResult<()> {
        if horizon == 0 || horizon > self.max_horizon {
            return Err(GarchError::InvalidHorizon { horizon, max: self.max_horizon });
        }
        Ok(())
    }
}

impl Default for Forecaster {
    fn default() -> Self {
        Forecaster { max_horizon: DEFAULT_MAX_HORIZON }
    }
}
