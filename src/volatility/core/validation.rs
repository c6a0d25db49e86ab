//! Parameter-level checks shared by [`GarchParams`](super::params::GarchParams)
//! and the likelihood workspace. Each returns the first offending entry.
use crate::volatility::errors::{ParamError, ParamResult};
use ndarray::ArrayView1;

pub fn validate_theta(theta: ArrayView1<f64>, dim: usize) -> ParamResult<()> {
    if theta.len() != dim {
        return Err(ParamError::ThetaLengthMismatch { expected: dim, actual: theta.len() });
    }
    match theta.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ParamError::InvalidThetaInput { index, value: theta[index] }),
        None => Ok(()),
    }
}

pub fn validate_omega(omega: f64) -> ParamResult<()> {
    if !omega.is_finite() || omega <= 0.0 {
        return Err(ParamError::InvalidOmega { value: omega });
    }
    Ok(())
}

pub fn validate_alpha(alpha: ArrayView1<f64>, p: usize) -> ParamResult<()> {
    if alpha.len() != p {
        return Err(ParamError::AlphaLengthMismatch { expected: p, actual: alpha.len() });
    }
    match alpha.iter().position(|a| !a.is_finite() || *a < 0.0) {
        Some(index) => Err(ParamError::InvalidAlpha { index, value: alpha[index] }),
        None => Ok(()),
    }
}

pub fn validate_beta(beta: ArrayView1<f64>, q: usize) -> ParamResult<()> {
    if beta.len() != q {
        return Err(ParamError::BetaLengthMismatch { expected: q, actual: beta.len() });
    }
    match beta.iter().position(|b| !b.is_finite() || *b < 0.0) {
        Some(index) => Err(ParamError::InvalidBeta { index, value: beta[index] }),
        None => Ok(()),
    }
}

pub fn validate_nu(nu: f64) -> ParamResult<()> {
    if !nu.is_finite() || nu <= 2.0 {
        return Err(ParamError::InvalidNu { value: nu });
    }
    Ok(())
}
