//! Per-evaluation parameter view over the model's scratch buffers.
use crate::{
    optimization::numerical_stability::transformations::safe_softplus,
    volatility::{
        core::{
            params::{ParamBounds, ParamLayout},
            validation::{
                validate_alpha, validate_beta, validate_nu, validate_omega, validate_theta,
            },
        },
        errors::{ParamError, ParamResult},
    },
};
use ndarray::{ArrayView1, ArrayViewMut1, Zip, s};

/// Current parameter values during a likelihood or gradient evaluation.
///
/// α and β are written into borrowed scratch storage so repeated
/// evaluations do not allocate; scalars are stored inline. `nu` is 0 when
/// the layout has no shape parameter.
#[derive(Debug)]
pub struct WorkSpace<'a> {
    pub alpha: ArrayViewMut1<'a, f64>,
    pub beta: ArrayViewMut1<'a, f64>,
    pub mu: f64,
    pub omega: f64,
    pub nu: f64,
}

impl<'a> WorkSpace<'a> {
    /// # Errors
    /// - `AlphaLengthMismatch` / `BetaLengthMismatch` when the buffers do not
    ///   match the layout.
    pub fn new(
        alpha: ArrayViewMut1<'a, f64>, beta: ArrayViewMut1<'a, f64>, layout: &ParamLayout,
    ) -> ParamResult<Self> {
        if alpha.len() != layout.p {
            return Err(ParamError::AlphaLengthMismatch { expected: layout.p, actual: alpha.len() });
        }
        if beta.len() != layout.q {
            return Err(ParamError::BetaLengthMismatch { expected: layout.q, actual: beta.len() });
        }
        Ok(WorkSpace { alpha, beta, mu: 0.0, omega: 0.0, nu: 0.0 })
    }

    /// Overwrite the workspace from θ.
    ///
    /// On error the workspace may be partially updated and must not be used
    /// for a likelihood evaluation.
    pub fn update(
        &mut self, theta: ArrayView1<f64>, layout: &ParamLayout, bounds: &ParamBounds,
    ) -> ParamResult<()> {
        validate_theta(theta, layout.dim())?;
        self.mu = layout.mu_idx().map_or(0.0, |i| theta[i]);
        self.omega = bounds.omega_min + safe_softplus(theta[layout.omega_idx()]);
        validate_omega(self.omega)?;
        Zip::from(&mut self.alpha)
            .and(theta.slice(s![layout.alpha_range()]))
            .for_each(|a, &t| *a = bounds.alpha_min + safe_softplus(t));
        Zip::from(&mut self.beta)
            .and(theta.slice(s![layout.beta_range()]))
            .for_each(|b, &t| *b = bounds.beta_min + safe_softplus(t));
        validate_alpha(self.alpha.view(), layout.p)?;
        validate_beta(self.beta.view(), layout.q)?;
        self.nu = match layout.nu_idx() {
            Some(i) => {
                let nu = bounds.nu_min + safe_softplus(theta[i]);
                validate_nu(nu)?;
                nu
            }
            None => 0.0,
        };
        Ok(())
    }
}
