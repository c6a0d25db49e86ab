//! Conditional innovation distributions.
//!
//! Each distribution supplies the per-observation log-density of a residual
//! `ε` given its conditional variance `σ²` and the partial derivatives the
//! analytic gradient needs. Terms that depend on ν only are split out
//! ([`Distribution::log_const`], [`Distribution::dnu_const`]) so a full pass
//! over the sample evaluates the gamma functions once.
use crate::volatility::errors::{GarchError, GarchResult};
use serde::Serialize;
use statrs::function::gamma::{digamma, ln_gamma};
use std::{f64::consts::PI, str::FromStr};

/// Innovation law of the standardized residual `z_t = ε_t / σ_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Distribution {
    /// Standard normal.
    Normal,
    /// Student-t with ν > 2 degrees of freedom, rescaled to unit variance.
    /// ν is estimated jointly with the variance parameters.
    StudentT,
}

/// Partial derivatives of one log-density term.
///
/// - `d_sigma2`: ∂l/∂σ²
/// - `d_mu`: direct ∂l/∂μ through `ε = r − μ` (not through σ²)
/// - `d_nu`: ∂l/∂ν, observation-dependent part only; 0 for `Normal`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityScore {
    pub d_sigma2: f64,
    pub d_mu: f64,
    pub d_nu: f64,
}

impl Distribution {
    pub fn has_shape(&self) -> bool {
        matches!(self, Distribution::StudentT)
    }

    /// Part of the log-density that depends only on ν.
    pub fn log_const(&self, nu: f64) -> f64 {
        match self {
            Distribution::Normal => -0.5 * (2.0 * PI).ln(),
            Distribution::StudentT => {
                ln_gamma(0.5 * (nu + 1.0)) - ln_gamma(0.5 * nu) - 0.5 * (PI * (nu - 2.0)).ln()
            }
        }
    }

    /// Derivative of [`Distribution::log_const`] with respect to ν.
    pub fn dnu_const(&self, nu: f64) -> f64 {
        match self {
            Distribution::Normal => 0.0,
            Distribution::StudentT => {
                0.5 * digamma(0.5 * (nu + 1.0)) - 0.5 * digamma(0.5 * nu) - 0.5 / (nu - 2.0)
            }
        }
    }

    /// Observation-dependent part of `ln f(ε | σ², ν)`.
    ///
    /// # Errors
    /// - `InvalidLogLikInput` when `ε` or `σ²` is non-finite, or `σ² ≤ 0`.
    pub fn log_kernel(&self, eps: f64, sigma2: f64, nu: f64) -> GarchResult<f64> {
        check_inputs(eps, sigma2)?;
        let value = match self {
            Distribution::Normal => -0.5 * (sigma2.ln() + eps * eps / sigma2),
            Distribution::StudentT => {
                let z = eps * eps / ((nu - 2.0) * sigma2);
                -0.5 * sigma2.ln() - 0.5 * (nu + 1.0) * z.ln_1p()
            }
        };
        Ok(value)
    }

    /// Full log-density, `log_const(ν) + log_kernel(ε, σ², ν)`.
    pub fn log_density(&self, eps: f64, sigma2: f64, nu: f64) -> GarchResult<f64> {
        Ok(self.log_const(nu) + self.log_kernel(eps, sigma2, nu)?)
    }

    /// Partial derivatives of the log-density at one observation.
    pub fn score(&self, eps: f64, sigma2: f64, nu: f64) -> GarchResult<DensityScore> {
        check_inputs(eps, sigma2)?;
        let score = match self {
            Distribution::Normal => DensityScore {
                d_sigma2: 0.5 * (eps * eps / sigma2 - 1.0) / sigma2,
                d_mu: eps / sigma2,
                d_nu: 0.0,
            },
            Distribution::StudentT => {
                let nu_m2 = nu - 2.0;
                let z = eps * eps / (nu_m2 * sigma2);
                let a = 1.0 + z;
                DensityScore {
                    d_sigma2: (-0.5 + 0.5 * (nu + 1.0) * z / a) / sigma2,
                    d_mu: (nu + 1.0) * eps / (nu_m2 * sigma2 * a),
                    d_nu: -0.5 * a.ln() + 0.5 * (nu + 1.0) * z / (nu_m2 * a),
                }
            }
        };
        Ok(score)
    }
}

impl FromStr for Distribution {
    type Err = GarchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "normal" | "gaussian" => Ok(Distribution::Normal),
            "studentt" | "t" | "student" => Ok(Distribution::StudentT),
            _ => Err(GarchError::InvalidParameters {
                reason: format!("unknown distribution '{s}'; expected 'normal' or 'student-t'"),
            }),
        }
    }
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Distribution::Normal => write!(f, "normal"),
            Distribution::StudentT => write!(f, "student-t"),
        }
    }
}

// ---- Helper methods ----

fn check_inputs(eps: f64, sigma2: f64) -> GarchResult<()> {
    if !eps.is_finite() {
        return Err(GarchError::InvalidLogLikInput { value: eps });
    }
    if !sigma2.is_finite() || sigma2 <= 0.0 {
        return Err(GarchError::InvalidLogLikInput { value: sigma2 });
    }
    Ok(())
}
