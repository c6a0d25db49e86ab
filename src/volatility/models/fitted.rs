//! Fitted-model snapshot and soft warnings.
use crate::volatility::core::{
    distribution::Distribution, guards::VarianceGuards, options::MeanModel, params::GarchParams,
    spec::GarchSpec,
};
use chrono::NaiveDate;
use ndarray::Array1;
use serde::Serialize;

/// Conditions that do not invalidate a fit but should be surfaced with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FitWarning {
    /// The optimizer stopped without meeting a tolerance (usually `max_iter`).
    ConvergenceFailure { status: String, iterations: usize },
    /// `Σα + Σβ ≥ 1`: the variance process has no finite long-run level.
    NonStationaryFit { persistence: f64 },
}

impl std::fmt::Display for FitWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitWarning::ConvergenceFailure { status, iterations } => write!(
                f,
                "Optimizer did not converge after {iterations} iterations (status: {status})"
            ),
            FitWarning::NonStationaryFit { persistence } => write!(
                f,
                "Non-stationary fit: alpha + beta = {persistence:.4} >= 1; long-horizon \
                 forecasts grow without bound"
            ),
        }
    }
}

/// Result of a GARCH fit, in the units of the returns passed to `fit`.
///
/// Series fields are aligned 1:1 with the input returns. `estimates` and
/// `std_errors` follow the order of `param_names`; `std_errors` is `None`
/// when the information
/// matrix could not be computed. `guards` are the estimation guards mapped
/// to original units and are reused by the forecaster.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    pub spec: GarchSpec,
    pub mean: MeanModel,
    pub distribution: Distribution,
    pub params: GarchParams,
    pub param_names: Vec<String>,
    pub estimates: Array1<f64>,
    pub conditional_variance: Array1<f64>,
    pub conditional_volatility: Array1<f64>,
    pub residuals: Array1<f64>,
    pub log_likelihood: f64,
    pub converged: bool,
    pub iterations: usize,
    pub status: String,
    pub std_errors: Option<Array1<f64>>,
    pub aic: f64,
    pub bic: f64,
    pub warnings: Vec<FitWarning>,
    pub guards: VarianceGuards,
    pub n_obs: usize,
    pub last_date: Option<NaiveDate>,
}

impl FittedModel {
    /// Number of estimated parameters (the `k` in AIC/BIC).
    pub fn num_params(&self) -> usize {
        self.param_names.len()
    }

    pub fn is_stationary(&self) -> bool {
        self.params.is_stationary()
    }

    /// `(name, estimate, std_error)` triples in estimation order.
    pub fn summary_rows(&self) -> Vec<(String, f64, Option<f64>)> {
        self.param_names
            .iter()
            .zip(self.estimates.iter())
            .enumerate()
            .map(|(i, (name, &value))| {
                let se = self.std_errors.as_ref().and_then(|se| se.get(i).copied());
                (name.clone(), value, se)
            })
            .collect()
    }
}
