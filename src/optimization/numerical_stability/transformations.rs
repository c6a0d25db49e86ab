//! Overflow-safe scalar transforms between bounded parameters and ℝ.
//!
//! Positive parameters are optimized as `x = lower + softplus(θ)`, whose
//! derivative `dx/dθ = logistic(θ)` is also needed for gradients and the
//! delta method. Cutoffs at `|x| > 20` keep every branch well-conditioned
//! in `f64`.

/// Eigenvalues at or below this value are treated as zero when inverting an
/// information matrix.
pub const EIGEN_EPS: f64 = 1e-10;

/// Smallest distance above a lower bound that [`safe_softplus_inv`] is asked
/// to invert. Starting values sitting exactly on a bound are nudged to it.
pub const PARAM_FLOOR: f64 = 1e-8;

/// Stable `ln(1 + exp(x))`, mapping ℝ → (0, ∞).
#[inline]
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Inverse of [`safe_softplus`] for `x > 0`: `ln(exp(x) - 1)`.
///
/// Non-positive inputs produce `-inf` or `NaN`; callers floor their inputs
/// at [`PARAM_FLOOR`] first.
#[inline]
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}

/// Stable logistic `1 / (1 + exp(-x))`, the derivative of [`safe_softplus`].
#[inline]
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}
