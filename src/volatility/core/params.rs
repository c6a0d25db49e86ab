//! GARCH parameters, their optimizer coordinates, and scratch buffers.
//!
//! Optimizer coordinates
//! ---------------------
//! The optimizer works on an unconstrained vector θ laid out as
//!
//! `θ = (θ_μ?, θ_ω, θ_α[0..p), θ_β[0..q), θ_ν?)`
//!
//! where `θ_μ` is present only for a constant mean and `θ_ν` only for the
//! Student-t law. Bounded parameters are recovered as
//! `x = lower + softplus(θ_x)` (see [`ParamBounds`]); μ is the identity.
//! Every θ therefore maps strictly inside the bounds, and stationarity is
//! deliberately not imposed.
use crate::{
    optimization::numerical_stability::transformations::{
        PARAM_FLOOR, safe_logistic, safe_softplus, safe_softplus_inv,
    },
    volatility::{
        core::{
            distribution::Distribution,
            options::MeanModel,
            spec::GarchSpec,
            validation::{
                validate_alpha, validate_beta, validate_nu, validate_omega, validate_theta,
            },
        },
        errors::{ParamError, ParamResult},
    },
};
use ndarray::{Array1, Array2, ArrayView1, s};
use std::{cell::RefCell, ops::Range};

/// Lower bounds of the constrained parameters, in the (scaled) units the
/// optimizer sees.
///
/// - `omega_min > 0`
/// - `alpha_min ≥ 0`, `beta_min ≥ 0`
/// - `nu_min > 2`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamBounds {
    pub omega_min: f64,
    pub alpha_min: f64,
    pub beta_min: f64,
    pub nu_min: f64,
}

impl ParamBounds {
    /// # Errors
    /// - `InvalidBounds` naming the first offending bound.
    pub fn new(omega_min: f64, alpha_min: f64, beta_min: f64, nu_min: f64) -> ParamResult<Self> {
        if !omega_min.is_finite() || omega_min <= 0.0 {
            return Err(ParamError::InvalidBounds { name: "omega", value: omega_min });
        }
        if !alpha_min.is_finite() || alpha_min < 0.0 {
            return Err(ParamError::InvalidBounds { name: "alpha", value: alpha_min });
        }
        if !beta_min.is_finite() || beta_min < 0.0 {
            return Err(ParamError::InvalidBounds { name: "beta", value: beta_min });
        }
        if !nu_min.is_finite() || nu_min <= 2.0 {
            return Err(ParamError::InvalidBounds { name: "nu", value: nu_min });
        }
        Ok(ParamBounds { omega_min, alpha_min, beta_min, nu_min })
    }
}

impl Default for ParamBounds {
    fn default() -> Self {
        ParamBounds { omega_min: 1e-10, alpha_min: 0.0, beta_min: 0.0, nu_min: 2.05 }
    }
}

/// Positions of each parameter block inside θ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamLayout {
    pub p: usize,
    pub q: usize,
    pub has_mu: bool,
    pub has_nu: bool,
}

impl ParamLayout {
    pub fn new(spec: &GarchSpec, mean: MeanModel, distribution: Distribution) -> Self {
        ParamLayout {
            p: spec.p,
            q: spec.q,
            has_mu: matches!(mean, MeanModel::Constant),
            has_nu: distribution.has_shape(),
        }
    }

    /// Total length of θ; also the `k` used by AIC/BIC.
    pub fn dim(&self) -> usize {
        usize::from(self.has_mu) + 1 + self.p + self.q + usize::from(self.has_nu)
    }

    pub fn mu_idx(&self) -> Option<usize> {
        self.has_mu.then_some(0)
    }

    pub fn omega_idx(&self) -> usize {
        usize::from(self.has_mu)
    }

    pub fn alpha_range(&self) -> Range<usize> {
        let start = self.omega_idx() + 1;
        start..start + self.p
    }

    pub fn beta_range(&self) -> Range<usize> {
        let start = self.alpha_range().end;
        start..start + self.q
    }

    pub fn nu_idx(&self) -> Option<usize> {
        self.has_nu.then_some(self.beta_range().end)
    }

    /// Parameter names in θ order, for reports.
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.dim());
        if self.has_mu {
            names.push("mu".to_string());
        }
        names.push("omega".to_string());
        names.extend((1..=self.p).map(|i| format!("alpha[{i}]")));
        names.extend((1..=self.q).map(|j| format!("beta[{j}]")));
        if self.has_nu {
            names.push("nu".to_string());
        }
        names
    }

    /// `dx/dθ` for each coordinate: 1 for μ, `logistic(θ)` for bounded ones.
    pub fn jacobian_diag(&self, theta: ArrayView1<f64>) -> Array1<f64> {
        let mut jac = theta.mapv(safe_logistic);
        if let Some(i) = self.mu_idx() {
            jac[i] = 1.0;
        }
        jac
    }
}

/// Interior-mutable buffers reused across likelihood evaluations.
///
/// - `alpha_buf` (p), `beta_buf` (q): current α, β.
/// - `eps_buf` (n): residuals `ε_t = r_t − μ`.
/// - `eps2_buf` (n + p): `p` pre-sample slots, then `ε_t²`.
/// - `var_buf` (n + q): `q` pre-sample slots, then `σ_t²`.
/// - `clamped_buf` (n): whether `σ_t²` hit a variance guard.
/// - `deriv_buf` ((n + q) × dim): `∂σ_t²/∂x` rows, pre-sample rows zero.
#[derive(Debug, Clone, PartialEq)]
pub struct GarchScratch {
    pub alpha_buf: RefCell<Array1<f64>>,
    pub beta_buf: RefCell<Array1<f64>>,
    pub eps_buf: RefCell<Array1<f64>>,
    pub eps2_buf: RefCell<Array1<f64>>,
    pub var_buf: RefCell<Array1<f64>>,
    pub clamped_buf: RefCell<Vec<bool>>,
    pub deriv_buf: RefCell<Array2<f64>>,
}

impl GarchScratch {
    pub fn new(n: usize, layout: &ParamLayout) -> GarchScratch {
        let (p, q) = (layout.p, layout.q);
        GarchScratch {
            alpha_buf: RefCell::new(Array1::zeros(p)),
            beta_buf: RefCell::new(Array1::zeros(q)),
            eps_buf: RefCell::new(Array1::zeros(n)),
            eps2_buf: RefCell::new(Array1::zeros(n + p)),
            var_buf: RefCell::new(Array1::zeros(n + q)),
            clamped_buf: RefCell::new(vec![false; n]),
            deriv_buf: RefCell::new(Array2::zeros((n + q, layout.dim()))),
        }
    }

    /// Number of observations the buffers were sized for.
    pub fn n_obs(&self) -> usize {
        self.eps_buf.borrow().len()
    }
}

/// Model-space GARCH parameters.
///
/// - `mu`: constant mean (0 under [`MeanModel::Zero`]).
/// - `omega > 0`, `alpha[i] ≥ 0` (length p), `beta[j] ≥ 0` (length q).
/// - `nu`: Student-t degrees of freedom, `None` for the normal law.
#[derive(Debug, Clone, PartialEq)]
pub struct GarchParams {
    pub mu: f64,
    pub omega: f64,
    pub alpha: Array1<f64>,
    pub beta: Array1<f64>,
    pub nu: Option<f64>,
}

impl GarchParams {
    /// Validated construction from model-space values.
    ///
    /// # Errors
    /// - `InvalidMu`, `InvalidOmega`, `InvalidAlpha`/`AlphaLengthMismatch`,
    ///   `InvalidBeta`/`BetaLengthMismatch`, `InvalidNu`.
    pub fn new(
        mu: f64, omega: f64, alpha: Array1<f64>, beta: Array1<f64>, nu: Option<f64>,
        spec: &GarchSpec,
    ) -> ParamResult<Self> {
        if !mu.is_finite() {
            return Err(ParamError::InvalidMu { value: mu });
        }
        validate_omega(omega)?;
        validate_alpha(alpha.view(), spec.p)?;
        validate_beta(beta.view(), spec.q)?;
        if let Some(nu) = nu {
            validate_nu(nu)?;
        }
        Ok(GarchParams { mu, omega, alpha, beta, nu })
    }

    /// Map optimizer coordinates to parameters.
    ///
    /// # Errors
    /// - `ThetaLengthMismatch` / `InvalidThetaInput` for a malformed θ.
    /// - Any parameter validation failure (e.g. an ω that underflowed).
    pub fn from_theta(
        theta: ArrayView1<f64>, layout: &ParamLayout, bounds: &ParamBounds,
    ) -> ParamResult<Self> {
        validate_theta(theta, layout.dim())?;
        let mu = layout.mu_idx().map_or(0.0, |i| theta[i]);
        let omega = bounds.omega_min + safe_softplus(theta[layout.omega_idx()]);
        let alpha =
            theta.slice(s![layout.alpha_range()]).mapv(|t| bounds.alpha_min + safe_softplus(t));
        let beta =
            theta.slice(s![layout.beta_range()]).mapv(|t| bounds.beta_min + safe_softplus(t));
        let nu = layout.nu_idx().map(|i| bounds.nu_min + safe_softplus(theta[i]));
        validate_omega(omega)?;
        validate_alpha(alpha.view(), layout.p)?;
        validate_beta(beta.view(), layout.q)?;
        if let Some(nu) = nu {
            validate_nu(nu)?;
        }
        Ok(GarchParams { mu, omega, alpha, beta, nu })
    }

    /// Inverse of [`GarchParams::from_theta`].
    ///
    /// Values at or below their lower bound are lifted to `lower +
    /// PARAM_FLOOR` first, so a starting point on the boundary still maps to a
    /// finite θ. A missing ν under a Student-t layout starts at 8.
    pub fn to_theta(&self, layout: &ParamLayout, bounds: &ParamBounds) -> Array1<f64> {
        let inv = |x: f64, lower: f64| safe_softplus_inv((x - lower).max(PARAM_FLOOR));
        let mut theta = Array1::<f64>::zeros(layout.dim());
        if let Some(i) = layout.mu_idx() {
            theta[i] = self.mu;
        }
        theta[layout.omega_idx()] = inv(self.omega, bounds.omega_min);
        theta
            .slice_mut(s![layout.alpha_range()])
            .iter_mut()
            .zip(self.alpha.iter())
            .for_each(|(t, &a)| *t = inv(a, bounds.alpha_min));
        theta
            .slice_mut(s![layout.beta_range()])
            .iter_mut()
            .zip(self.beta.iter())
            .for_each(|(t, &b)| *t = inv(b, bounds.beta_min));
        if let Some(i) = layout.nu_idx() {
            theta[i] = inv(self.nu.unwrap_or(8.0), bounds.nu_min);
        }
        theta
    }

    /// Model-space values in θ order (same order as [`ParamLayout::names`]).
    pub fn to_vec(&self, layout: &ParamLayout) -> Array1<f64> {
        let mut out = Array1::<f64>::zeros(layout.dim());
        if let Some(i) = layout.mu_idx() {
            out[i] = self.mu;
        }
        out[layout.omega_idx()] = self.omega;
        out.slice_mut(s![layout.alpha_range()]).assign(&self.alpha);
        out.slice_mut(s![layout.beta_range()]).assign(&self.beta);
        if let (Some(i), Some(nu)) = (layout.nu_idx(), self.nu) {
            out[i] = nu;
        }
        out
    }

    /// `Σα + Σβ`.
    pub fn persistence(&self) -> f64 {
        self.alpha.sum() + self.beta.sum()
    }

    /// Covariance stationarity: `Σα + Σβ < 1`.
    pub fn is_stationary(&self) -> bool {
        self.persistence() < 1.0
    }

    /// `ω / (1 − Σα − Σβ)`, or `None` for a non-stationary parameter set.
    pub fn unconditional_variance(&self) -> Option<f64> {
        self.is_stationary().then(|| self.omega / (1.0 - self.persistence()))
    }

    /// Parameters for returns divided by `factor`: `μ / factor`,
    /// `ω / factor²`; α, β and ν are scale-free.
    pub fn rescaled(&self, factor: f64) -> GarchParams {
        GarchParams {
            mu: self.mu / factor,
            omega: self.omega / (factor * factor),
            alpha: self.alpha.clone(),
            beta: self.beta.clone(),
            nu: self.nu,
        }
    }
}
