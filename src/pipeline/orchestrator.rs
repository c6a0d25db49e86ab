//! Pipeline orchestrator: fetch → log returns → fit → forecast.
//!
//! [`run`] is the single boundary where errors stop propagating: every
//! failure, from a bad request to an optimizer breakdown, comes back as
//! [`PipelineResult::Failure`] with a [`FailureKind`] and a readable reason.
//! Soft fit warnings ride along on [`PipelineResult::Success`].
use crate::{
    pipeline::{config::PipelineConfig, fetch::PriceFetcher},
    volatility::{
        core::{returns::compute_log_returns, spec::GarchSpec},
        errors::{GarchError, GarchResult},
        models::{
            fitted::{FitWarning, FittedModel},
            forecaster::{ForecastSeries, Forecaster},
            garch::GarchModel,
        },
    },
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

/// One pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub p: usize,
    pub q: usize,
    pub horizon: usize,
}

/// In-sample conditional volatility at one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub volatility: f64,
}

/// One estimated parameter, in original return units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamEstimate {
    pub name: String,
    pub value: f64,
    pub std_error: Option<f64>,
}

/// Fit-quality figures reported alongside the parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitDiagnostics {
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub converged: bool,
    pub iterations: usize,
    pub persistence: f64,
    pub num_params: usize,
    pub n_obs: usize,
}

/// Coarse category of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// The request or configuration was rejected before any fetch.
    InvalidRequest,
    /// The source returned nothing for the ticker and range.
    NoData,
    /// Too few prices or returns.
    InsufficientData,
    /// Prices or returns failed validation.
    InvalidData,
    /// The optimizer or likelihood failed.
    Estimation,
    /// Reading or parsing the source failed.
    Io,
}

impl From<&GarchError> for FailureKind {
    fn from(err: &GarchError) -> Self {
        match err {
            GarchError::InvalidParameters { .. }
            | GarchError::InvalidHorizon { .. }
            | GarchError::InvalidVarianceGuards { .. } => FailureKind::InvalidRequest,
            GarchError::NoDataFound { .. } => FailureKind::NoData,
            GarchError::InsufficientData { .. } => FailureKind::InsufficientData,
            GarchError::InvalidPrice { .. }
            | GarchError::UnorderedDates { .. }
            | GarchError::NonFiniteData { .. } => FailureKind::InvalidData,
            GarchError::Param(_)
            | GarchError::NonFiniteVariance { .. }
            | GarchError::InvalidLogLikInput { .. }
            | GarchError::OptimizationFailed { .. }
            | GarchError::ModelNotFitted => FailureKind::Estimation,
            GarchError::Io { .. } | GarchError::Parse { .. } => FailureKind::Io,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::InvalidRequest => "invalid request",
            FailureKind::NoData => "no data",
            FailureKind::InsufficientData => "insufficient data",
            FailureKind::InvalidData => "invalid data",
            FailureKind::Estimation => "estimation failure",
            FailureKind::Io => "I/O failure",
        };
        write!(f, "{name}")
    }
}

/// Outcome of [`run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PipelineResult {
    Success {
        ticker: String,
        spec: GarchSpec,
        historical: Vec<HistoricalPoint>,
        forecast: ForecastSeries,
        params: Vec<ParamEstimate>,
        diagnostics: FitDiagnostics,
        warnings: Vec<FitWarning>,
    },
    Failure {
        kind: FailureKind,
        reason: String,
    },
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Success { .. })
    }
}

/// run — execute one request end to end.
///
/// Parameters
/// ----------
/// - `request`: `&PipelineRequest`
///   Ticker, inclusive date range, GARCH orders and forecast horizon.
/// - `fetcher`: `&dyn PriceFetcher`
///   Price source.
/// - `config`: `&PipelineConfig`
///   Limits and estimation settings.
///
/// Returns
/// -------
/// `PipelineResult`
///   `Success` with the in-sample volatility, the dated forecast, the
///   parameter table and any soft warnings; otherwise `Failure`.
///
/// Notes
/// -----
/// - The request and the config are validated before the fetcher is called.
/// - Stages run in order: fetch, empty check, log returns, minimum-length
///   check, fit, forecast.
pub fn run(
    request: &PipelineRequest, fetcher: &dyn PriceFetcher, config: &PipelineConfig,
) -> PipelineResult {
    match run_stages(request, fetcher, config) {
        Ok(result) => result,
        Err(err) => {
            let kind = FailureKind::from(&err);
            warn!(ticker = %request.ticker, %kind, error = %err, "pipeline failed");
            PipelineResult::Failure { kind, reason: err.to_string() }
        }
    }
}

/// Request validation, independent of any data.
///
/// # Errors
/// - `InvalidParameters` for an empty or path-like ticker, `start ≥ end`,
///   orders outside `[1, max_order]`, or an invalid config.
/// - `InvalidHorizon` for a horizon outside `[1, max_horizon]`.
pub fn validate_request(
    request: &PipelineRequest, config: &PipelineConfig,
) -> GarchResult<GarchSpec> {
    config.validate()?;
    let ticker = request.ticker.trim();
    if ticker.is_empty() {
        return Err(GarchError::InvalidParameters { reason: "ticker must not be empty".into() });
    }
    if ticker.contains(['/', '\\']) || ticker.contains("..") {
        return Err(GarchError::InvalidParameters {
            reason: format!("ticker '{ticker}' contains path characters"),
        });
    }
    if request.start >= request.end {
        return Err(GarchError::InvalidParameters {
            reason: format!("start date {} must be before end date {}", request.start, request.end),
        });
    }
    let spec = GarchSpec::with_max_order(request.p, request.q, config.max_order)?;
    if request.horizon == 0 || request.horizon > config.max_horizon {
        return Err(GarchError::InvalidHorizon {
            horizon: request.horizon,
            max: config.max_horizon,
        });
    }
    Ok(spec)
}

// ---- Helper methods ----

fn run_stages(
    request: &PipelineRequest, fetcher: &dyn PriceFetcher, config: &PipelineConfig,
) -> GarchResult<PipelineResult> {
    let spec = validate_request(request, config)?;
    let options = config.garch_options()?;
    let ticker = request.ticker.trim().to_string();

    let prices = fetcher.fetch(&ticker, request.start, request.end)?;
    if prices.is_empty() {
        return Err(GarchError::NoDataFound { ticker });
    }
    let returns = compute_log_returns(&prices)?;
    info!(
        ticker = %ticker,
        prices = prices.len(),
        returns = returns.len(),
        mean = returns.mean(),
        variance = returns.sample_variance(),
        "prices loaded"
    );
    if returns.len() < config.min_returns {
        return Err(GarchError::InsufficientData {
            needed: config.min_returns,
            found: returns.len(),
            context: "log returns",
        });
    }

    let mut model = GarchModel::new(spec, options, returns.len());
    let fitted = model.fit(&returns)?;
    let forecaster = Forecaster::new(config.max_horizon);
    let forecast = forecaster.forecast(&fitted, &returns, request.horizon)?;
    info!(ticker = %ticker, horizon = request.horizon, "forecast ready");

    let historical = returns
        .dates()
        .iter()
        .zip(fitted.conditional_volatility.iter())
        .map(|(&date, &volatility)| HistoricalPoint { date, volatility })
        .collect();
    Ok(PipelineResult::Success {
        ticker,
        spec,
        historical,
        forecast,
        params: param_table(&fitted),
        diagnostics: diagnostics(&fitted),
        warnings: fitted.warnings.clone(),
    })
}

fn param_table(fitted: &FittedModel) -> Vec<ParamEstimate> {
    fitted
        .summary_rows()
        .into_iter()
        .map(|(name, value, std_error)| ParamEstimate { name, value, std_error })
        .collect()
}

fn diagnostics(fitted: &FittedModel) -> FitDiagnostics {
    FitDiagnostics {
        log_likelihood: fitted.log_likelihood,
        aic: fitted.aic,
        bic: fitted.bic,
        converged: fitted.converged,
        iterations: fitted.iterations,
        persistence: fitted.params.persistence(),
        num_params: fitted.num_params(),
        n_obs: fitted.n_obs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pipeline::fetch::InMemoryFetcher,
        volatility::core::{
            distribution::Distribution,
            options::SimOpts,
            params::GarchParams,
            returns::PriceSeries,
            simulation::{price_path, simulate_garch},
        },
    };
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover request validation ahead of any fetch, the mapping of
    // each stage's error to a `FailureKind`, and one successful run.
    // -------------------------------------------------------------------------

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .and_then(|d| d.checked_add_days(chrono::Days::new(offset)))
            .expect("valid date")
    }

    fn request(ticker: &str, p: usize, q: usize, horizon: usize) -> PipelineRequest {
        PipelineRequest { ticker: ticker.into(), start: day(0), end: day(1000), p, q, horizon }
    }

    fn simulated_prices(n: usize) -> PriceSeries {
        let spec = GarchSpec { p: 1, q: 1 };
        let params = GarchParams::new(0.0002, 1e-6, array![0.08], array![0.9], None, &spec)
            .expect("valid");
        let path = simulate_garch(&params, Distribution::Normal, n, &SimOpts::new(Some(9), 250))
            .expect("valid simulation");
        let prices = price_path(100.0, path.returns.view());
        let dates = (0..prices.len() as u64).map(day).collect();
        PriceSeries::new(dates, prices.to_vec()).expect("positive prices")
    }

    /// Fails the test if the pipeline reaches the fetcher.
    struct PanickingFetcher;

    impl PriceFetcher for PanickingFetcher {
        fn fetch(&self, _: &str, _: NaiveDate, _: NaiveDate) -> GarchResult<PriceSeries> {
            panic!("fetch must not be called for an invalid request")
        }
    }

    #[test]
    // Purpose
    // -------
    // Invalid requests fail before any fetch.
    //
    // Given
    // -----
    // - Empty ticker, p = 6, horizon 0, horizon 31, reversed dates.
    //
    // Expect
    // ------
    // - `Failure { kind: InvalidRequest }` for all five; the fetcher is never
    //   called.
    fn invalid_requests_fail_before_fetch() {
        // Arrange
        let config = PipelineConfig::default();
        let mut reversed = request("SPY", 1, 1, 10);
        std::mem::swap(&mut reversed.start, &mut reversed.end);
        let requests = [
            request(" ", 1, 1, 10),
            request("SPY", 6, 1, 10),
            request("SPY", 1, 1, 0),
            request("SPY", 1, 1, 31),
            reversed,
        ];

        for req in requests {
            // Act
            let result = run(&req, &PanickingFetcher, &config);

            // Assert
            assert!(
                matches!(result, PipelineResult::Failure { kind: FailureKind::InvalidRequest, .. }),
                "{req:?} -> {result:?}"
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // Data-stage failures map to their kinds.
    //
    // Given
    // -----
    // - An unknown ticker; a ticker with 20 prices (19 returns < 30).
    //
    // Expect
    // ------
    // - `NoData` mentioning the ticker; `InsufficientData`.
    fn data_failures_map_to_kinds() {
        // Arrange
        let fetcher = InMemoryFetcher::new().with_series("SHORT", simulated_prices(19));
        let config = PipelineConfig::default();

        // Act
        let unknown = run(&request("NOPE", 1, 1, 5), &fetcher, &config);
        let short = run(&request("SHORT", 1, 1, 5), &fetcher, &config);

        // Assert
        match unknown {
            PipelineResult::Failure { kind, reason } => {
                assert_eq!(kind, FailureKind::NoData);
                assert!(reason.contains("NOPE"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(matches!(
            short,
            PipelineResult::Failure { kind: FailureKind::InsufficientData, .. }
        ));
    }

    #[test]
    // Purpose
    // -------
    // A well-formed request on a simulated series succeeds.
    //
    // Given
    // -----
    // - 400 returns, GARCH(1,1), horizon 7.
    //
    // Expect
    // ------
    // - 400 historical points, 7 positive forecast points dated after the
    //   last return, a parameter table with μ, ω, α, β.
    fn well_formed_request_succeeds() {
        // Arrange
        let fetcher = InMemoryFetcher::new().with_series("SIM", simulated_prices(400));

        // Act
        let result = run(&request("SIM", 1, 1, 7), &fetcher, &PipelineConfig::default());

        // Assert
        match result {
            PipelineResult::Success { historical, forecast, params, diagnostics, .. } => {
                assert_eq!(historical.len(), 400);
                assert_eq!(diagnostics.num_params, 4);
                assert_eq!(forecast.len(), 7);
                let last = historical.last().expect("non-empty").date;
                assert!(forecast.points.iter().all(|p| p.volatility > 0.0 && p.date > last));
                let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, vec!["mu", "omega", "alpha[1]", "beta[1]"]);
            }
            PipelineResult::Failure { kind, reason } => panic!("{kind}: {reason}"),
        }
    }
}
