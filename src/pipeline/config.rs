//! Pipeline limits and estimation settings.
//!
//! [`PipelineConfig`] deserializes from a JSON file in which every field is
//! optional; missing fields take the defaults below. Enumerated settings
//! (mean model, distribution, line search) are kept as strings and parsed
//! by [`PipelineConfig::garch_options`], so a bad value is reported with the
//! same error type as any other invalid input.
use crate::{
    optimization::loglik_optimizer::{LineSearcher, MLEOptions, Tolerances},
    volatility::{
        core::{
            distribution::Distribution,
            guards::VarianceGuards,
            options::{GarchOptions, MeanModel},
            params::ParamBounds,
            spec::MAX_ORDER,
        },
        errors::{GarchError, GarchResult},
        models::forecaster::DEFAULT_MAX_HORIZON,
    },
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default minimum number of log returns accepted by the pipeline.
pub const DEFAULT_MIN_RETURNS: usize = 30;

/// Default return scaling applied before estimation (returns in percent).
pub const DEFAULT_SCALE: f64 = 100.0;

/// Limits and estimation settings for one pipeline run.
///
/// - `max_order`: upper bound on p and q.
/// - `max_horizon`: upper bound on the forecast horizon.
/// - `min_returns`: fewer log returns than this is `InsufficientData`.
/// - `scale`: multiplier applied to returns before estimation.
/// - `mean`, `distribution`, `line_search`: parsed names (see the `FromStr`
///   impls of [`MeanModel`], [`Distribution`] and [`LineSearcher`]).
/// - `tol_grad`, `tol_cost`, `max_iter`, `lbfgs_mem`: optimizer controls.
/// - `variance_floor`, `variance_ceiling`: variance guards in scaled units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub max_order: usize,
    pub max_horizon: usize,
    pub min_returns: usize,
    pub scale: f64,
    pub mean: String,
    pub distribution: String,
    pub line_search: String,
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
    pub lbfgs_mem: Option<usize>,
    pub variance_floor: f64,
    pub variance_ceiling: f64,
    pub compute_std_errors: bool,
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let mle = MLEOptions::default();
        let guards = VarianceGuards::default();
        PipelineConfig {
            max_order: MAX_ORDER,
            max_horizon: DEFAULT_MAX_HORIZON,
            min_returns: DEFAULT_MIN_RETURNS,
            scale: DEFAULT_SCALE,
            mean: MeanModel::Constant.to_string(),
            distribution: Distribution::Normal.to_string(),
            line_search: mle.line_searcher.to_string(),
            tol_grad: mle.tols.tol_grad,
            tol_cost: mle.tols.tol_cost,
            max_iter: mle.tols.max_iter,
            lbfgs_mem: mle.lbfgs_mem,
            variance_floor: guards.min,
            variance_ceiling: guards.max,
            compute_std_errors: true,
            verbose: false,
        }
    }
}

impl PipelineConfig {
    /// Load and validate a JSON config file.
    ///
    /// # Errors
    /// - `Io` when the file cannot be read.
    /// - `Parse` for malformed JSON or unknown fields.
    /// - Any [`PipelineConfig::validate`] failure.
    pub fn from_json_file(path: &Path) -> GarchResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| GarchError::Io {
            path: path.display().to_string(),
            text: e.to_string(),
        })?;
        let config: PipelineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// - `InvalidParameters` for a zero limit, a `max_order` above the
    ///   crate-wide [`MAX_ORDER`], or any setting rejected by
    ///   [`PipelineConfig::garch_options`].
    pub fn validate(&self) -> GarchResult<()> {
        if self.max_order == 0 || self.max_order > MAX_ORDER {
            let reason = format!("max_order must be in [1, {MAX_ORDER}]; got {}", self.max_order);
            return Err(invalid(reason));
        }
        if self.max_horizon == 0 {
            return Err(invalid("max_horizon must be at least 1".to_string()));
        }
        if self.min_returns == 0 {
            return Err(invalid("min_returns must be at least 1".to_string()));
        }
        self.garch_options().map(|_| ())
    }

    /// Estimation options described by this config.
    ///
    /// # Errors
    /// - `InvalidParameters` for unknown names, invalid tolerances, a zero
    ///   L-BFGS memory or a non-positive scale.
    /// - `InvalidVarianceGuards` for an inconsistent floor/ceiling.
    pub fn garch_options(&self) -> GarchResult<GarchOptions> {
        let mean: MeanModel = self.mean.parse()?;
        let distribution: Distribution = self.distribution.parse()?;
        let line_searcher: LineSearcher =
            self.line_search.parse().map_err(|e| invalid(format!("{e}")))?;
        let tols = Tolerances::new(self.tol_grad, self.tol_cost, self.max_iter)
            .map_err(|e| invalid(format!("{e}")))?;
        let mle_opts = MLEOptions::new(tols, line_searcher, self.lbfgs_mem)
            .map_err(|e| invalid(format!("{e}")))?
            .with_verbose(self.verbose);
        let guards = VarianceGuards::new((self.variance_floor, self.variance_ceiling))?;
        GarchOptions::new(
            mean,
            distribution,
            mle_opts,
            guards,
            ParamBounds::default(),
            self.scale,
            self.compute_std_errors,
        )
    }
}

fn invalid(reason: String) -> GarchError {
    GarchError::InvalidParameters { reason }
}
