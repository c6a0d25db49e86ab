//! Estimation and simulation options.
use crate::{
    optimization::loglik_optimizer::MLEOptions,
    volatility::{
        core::{distribution::Distribution, guards::VarianceGuards, params::ParamBounds},
        errors::{GarchError, GarchResult},
    },
};
use serde::Serialize;
use std::str::FromStr;

/// Conditional mean of the returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MeanModel {
    /// `r_t = ε_t`.
    Zero,
    /// `r_t = μ + ε_t`, with μ estimated jointly.
    Constant,
}

impl FromStr for MeanModel {
    type Err = GarchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zero" | "none" => Ok(MeanModel::Zero),
            "constant" | "const" => Ok(MeanModel::Constant),
            _ => Err(GarchError::InvalidParameters {
                reason: format!("unknown mean model '{s}'; expected 'zero' or 'constant'"),
            }),
        }
    }
}

impl std::fmt::Display for MeanModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeanModel::Zero => write!(f, "zero"),
            MeanModel::Constant => write!(f, "constant"),
        }
    }
}

/// Everything `fit` needs besides the orders.
///
/// - `scale`: returns are multiplied by this factor before estimation and
///   all outputs are mapped back, so `bounds` and `guards` are expressed in
///   scaled units. Daily returns are well conditioned at 100 (percent).
/// - `compute_std_errors`: run the observed-information pass after fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct GarchOptions {
    pub mean: MeanModel,
    pub distribution: Distribution,
    pub mle_opts: MLEOptions,
    pub guards: VarianceGuards,
    pub bounds: ParamBounds,
    pub scale: f64,
    pub compute_std_errors: bool,
}

impl GarchOptions {
    /// # Errors
    /// - `InvalidParameters` when `scale` is not finite and > 0.
    pub fn new(
        mean: MeanModel, distribution: Distribution, mle_opts: MLEOptions,
        guards: VarianceGuards, bounds: ParamBounds, scale: f64, compute_std_errors: bool,
    ) -> GarchResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(GarchError::InvalidParameters {
                reason: format!("scale must be finite and > 0; got: {scale}"),
            });
        }
        Ok(GarchOptions { mean, distribution, mle_opts, guards, bounds, scale, compute_std_errors })
    }
}

impl Default for GarchOptions {
    fn default() -> Self {
        GarchOptions {
            mean: MeanModel::Constant,
            distribution: Distribution::Normal,
            mle_opts: MLEOptions::default(),
            guards: VarianceGuards::default(),
            bounds: ParamBounds::default(),
            scale: 1.0,
            compute_std_errors: true,
        }
    }
}

/// Simulation controls.
///
/// - `seed`: `Some` for reproducible draws.
/// - `burn_in`: leading draws discarded so the returned path does not depend
///   on the pre-sample initialization.
#[derive(Debug, Clone, PartialEq)]
pub struct SimOpts {
    pub seed: Option<u64>,
    pub burn_in: usize,
}

impl SimOpts {
    pub fn new(seed: Option<u64>, burn_in: usize) -> SimOpts {
        SimOpts { seed, burn_in }
    }
}

impl Default for SimOpts {
    fn default() -> Self {
        SimOpts { seed: Some(42), burn_in: 500 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Defaults and scale validation.
    //
    // Given
    // -----
    // - `GarchOptions::default()` and a construction with `scale = 0`.
    //
    // Expect
    // ------
    // - Constant mean, normal law, unit scale; zero scale rejected.
    fn defaults_and_scale_validation() {
        // Arrange
        let d = GarchOptions::default();

        // Act
        let bad = GarchOptions::new(
            d.mean,
            d.distribution,
            d.mle_opts.clone(),
            d.guards,
            d.bounds,
            0.0,
            true,
        );

        // Assert
        assert_eq!(d.mean, MeanModel::Constant);
        assert_eq!(d.distribution, Distribution::Normal);
        assert_eq!(d.scale, 1.0);
        assert!(matches!(bad, Err(GarchError::InvalidParameters { .. })));
        assert_eq!("CONST".parse::<MeanModel>(), Ok(MeanModel::Constant));
        assert!("ar1".parse::<MeanModel>().is_err());
    }
}
