//! GARCH(p, q) model: analytic log-likelihood, gradient, and fitting.
//!
//! This module wires a GARCH(p, q) specification to the `LogLikelihood`
//! trait. Each evaluation maps the optimizer vector θ into a [`WorkSpace`]
//! backed by the model's scratch buffers, runs the variance recursion, and
//! returns the **average** log-likelihood `ℓ(θ)/n` together with its
//! analytic gradient.
//!
//! Key ideas:
//! - Bounded parameters live in softplus coordinates (`x = lower +
//!   softplus(θ)`), so every iterate is admissible and L-BFGS runs
//!   unconstrained.
//! - The gradient is accumulated in model space by [`score_driver`] and mapped
//!   to θ with the diagonal Jacobian [`ParamLayout::jacobian_diag`].
//! - Averaging by `n` keeps the optimizer tolerances independent of the
//!   sample length.
use crate::{
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Grad, LogLikelihood, OptimOutcome, Theta},
    },
    volatility::{
        core::{
            data::GarchData,
            options::GarchOptions,
            params::{GarchScratch, ParamLayout},
            returns::ReturnSeries,
            spec::GarchSpec,
            validation::validate_theta,
            variance::{compute_variance, likelihood_driver, score_driver},
            workspace::WorkSpace,
        },
        errors::{GarchError, GarchResult},
        models::{
            estimation::{assemble_fit, initial_theta, optimize},
            fitted::FittedModel,
        },
    },
};
use ndarray::{Array1, ArrayView1, s};
use tracing::info;

/// GARCH(p, q) model with analytic log-likelihood and gradient.
///
/// Holds the model order (`spec`), estimation options (`options`), the
/// derived θ layout (`layout`), and scratch buffers (`scratch_bufs`) sized
/// for `n` observations and reused across evaluations. After a fit,
/// `results` keeps the raw optimizer outcome (θ̂ in optimizer coordinates,
/// useful for warm starts).
///
/// # Notes
/// - Scratch buffers use `RefCell`; a model is single-owner and not `Sync`.
/// - `fit` resizes the buffers when the sample length changes.
#[derive(Debug, Clone, PartialEq)]
pub struct GarchModel {
    pub spec: GarchSpec,
    pub options: GarchOptions,
    pub layout: ParamLayout,
    pub scratch_bufs: GarchScratch,
    pub results: Option<OptimOutcome>,
}

impl GarchModel {
    /// Construct a model with scratch buffers for `n` observations.
    pub fn new(spec: GarchSpec, options: GarchOptions, n: usize) -> GarchModel {
        let layout = ParamLayout::new(&spec, options.mean, options.distribution);
        let scratch_bufs = GarchScratch::new(n, &layout);
        GarchModel { spec, options, layout, scratch_bufs, results: None }
    }

    /// Fit by maximum likelihood on a dated return series.
    ///
    /// Identical to [`GarchModel::fit_values`] but records the last return
    /// date on the fitted model so forecasts can be dated.
    pub fn fit(&mut self, returns: &ReturnSeries) -> GarchResult<FittedModel> {
        let mut fitted = self.fit_values(returns.values())?;
        fitted.last_date = returns.last_date();
        Ok(fitted)
    }

    /// Fit by maximum likelihood on raw returns.
    ///
    /// ## Steps
    /// 1. Require `n ≥ p + q + 11` observations.
    /// 2. Scale the returns by `options.scale` and compute the backcast.
    /// 3. Start from α = 0.1/p, β = 0.85/q, ω = 0.05·backcast, μ = mean,
    ///    ν = 8 and run L-BFGS; a hard solver error is retried once with the
    ///    other line search.
    /// 4. Re-run the recursion at θ̂ and map everything back to the
    ///    original units.
    ///
    /// ## Errors
    /// - `InsufficientData` for a short sample.
    /// - `NonFiniteData` for NaN/±inf returns.
    /// - `OptimizationFailed` when both line searches fail.
    pub fn fit_values(&mut self, values: ArrayView1<f64>) -> GarchResult<FittedModel> {
        let n = values.len();
        let needed = self.spec.min_observations();
        if n < needed {
            return Err(GarchError::InsufficientData { needed, found: n, context: "GARCH fit" });
        }
        if self.scratch_bufs.n_obs() != n {
            self.scratch_bufs = GarchScratch::new(n, &self.layout);
        }
        let data = GarchData::new(values, self.options.scale)?;
        let theta0 = initial_theta(&self.layout, &self.options.bounds, &data);
        let outcome = optimize(self, theta0, &data)?;
        let fitted = assemble_fit(self, &outcome, &data)?;
        info!(
            spec = %self.spec,
            loglik = fitted.log_likelihood,
            iterations = fitted.iterations,
            converged = fitted.converged,
            "GARCH fit complete"
        );
        self.results = Some(outcome);
        Ok(fitted)
    }

    /// Residuals `ε_t` and conditional variances `σ²_t` at `theta`, in the
    /// scaled units of `data`.
    pub fn filter(
        &self, theta: ArrayView1<f64>, data: &GarchData,
    ) -> GarchResult<(Array1<f64>, Array1<f64>)> {
        let mut workspace_alpha = self.scratch_bufs.alpha_buf.borrow_mut();
        let mut workspace_beta = self.scratch_bufs.beta_buf.borrow_mut();
        let mut workspace =
            WorkSpace::new(workspace_alpha.view_mut(), workspace_beta.view_mut(), &self.layout)?;
        workspace.update(theta, &self.layout, &self.options.bounds)?;
        compute_variance(&workspace, data, self)?;
        let eps = self.scratch_bufs.eps_buf.borrow().to_owned();
        let var = self.scratch_bufs.var_buf.borrow().slice(s![self.layout.q..]).to_owned();
        Ok((eps, var))
    }
}

impl LogLikelihood for GarchModel {
    type Data = GarchData;

    /// Average log-likelihood `ℓ(θ)/n`.
    ///
    /// # Errors
    /// - Parameter errors when θ maps outside the admissible region
    ///   (e.g. ω underflow).
    /// - Non-finite variance or density inputs.
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64> {
        let mut workspace_alpha = self.scratch_bufs.alpha_buf.borrow_mut();
        let mut workspace_beta = self.scratch_bufs.beta_buf.borrow_mut();
        let mut workspace =
            WorkSpace::new(workspace_alpha.view_mut(), workspace_beta.view_mut(), &self.layout)?;
        workspace.update(theta.view(), &self.layout, &self.options.bounds)?;
        let total = likelihood_driver(self, &workspace, data)?;
        Ok(total / data.len() as f64)
    }

    /// Validate θ and that the data matches the scratch buffers.
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        validate_theta(theta.view(), self.layout.dim())?;
        if data.len() != self.scratch_bufs.n_obs() {
            return Err(OptError::from(GarchError::InvalidParameters {
                reason: format!(
                    "model buffers sized for {} observations; data has {}",
                    self.scratch_bufs.n_obs(),
                    data.len()
                ),
            }));
        }
        Ok(())
    }

    /// Analytic gradient of `ℓ(θ)/n` with respect to θ.
    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        let mut workspace_alpha = self.scratch_bufs.alpha_buf.borrow_mut();
        let mut workspace_beta = self.scratch_bufs.beta_buf.borrow_mut();
        let mut workspace =
            WorkSpace::new(workspace_alpha.view_mut(), workspace_beta.view_mut(), &self.layout)?;
        workspace.update(theta.view(), &self.layout, &self.options.bounds)?;
        let score = score_driver(self, &workspace, data)?;
        let jac = self.layout.jacobian_diag(theta.view());
        Ok(score * jac / data.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volatility::core::{
        distribution::Distribution,
        options::{GarchOptions, MeanModel, SimOpts},
        params::GarchParams,
        simulation::simulate_garch,
    };
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The averaged value/gradient pair seen by the optimizer.
    // - `check` guarding against mismatched data.
    // - A short-sample rejection and a small end-to-end fit.
    //
    // Parameter recovery on long samples lives in the integration tests.
    // -------------------------------------------------------------------------

    fn simulated(n: usize, seed: u64) -> Array1<f64> {
        let spec = GarchSpec { p: 1, q: 1 };
        let params =
            GarchParams::new(0.0, 0.05, array![0.1], array![0.85], None, &spec).expect("valid");
        simulate_garch(&params, Distribution::Normal, n, &SimOpts::new(Some(seed), 200))
            .expect("valid simulation")
            .returns
    }

    #[test]
    // Purpose
    // -------
    // The analytic gradient of the averaged objective matches central
    // differences of `value`.
    //
    // Given
    // -----
    // - GARCH(1,1), constant mean, normal law, 300 simulated returns.
    //
    // Expect
    // ------
    // - Each component within 1e-5.
    fn gradient_matches_finite_difference_of_value() {
        // Arrange
        let returns = simulated(300, 3);
        let model = GarchModel::new(GarchSpec { p: 1, q: 1 }, GarchOptions::default(), 300);
        let data = GarchData::new(returns.view(), 1.0).expect("finite");
        let theta = initial_theta(&model.layout, &model.options.bounds, &data);

        // Act
        let grad = model.grad(&theta, &data).expect("analytic gradient");

        // Assert
        for k in 0..theta.len() {
            let h = 1e-6;
            let mut up = theta.clone();
            let mut down = theta.clone();
            up[k] += h;
            down[k] -= h;
            let fd = (model.value(&up, &data).expect("finite")
                - model.value(&down, &data).expect("finite"))
                / (2.0 * h);
            assert!((grad[k] - fd).abs() < 1e-5, "k = {k}: {} vs {fd}", grad[k]);
        }
    }

    #[test]
    // Purpose
    // -------
    // `check` rejects data whose length differs from the scratch buffers.
    //
    // Given
    // -----
    // - A model sized for 50 observations and 40 data points.
    //
    // Expect
    // ------
    // - `Err(OptError::ModelError { .. })`.
    fn check_rejects_mismatched_data_length() {
        // Arrange
        let model = GarchModel::new(GarchSpec { p: 1, q: 1 }, GarchOptions::default(), 50);
        let data = GarchData::new(simulated(40, 1).view(), 1.0).expect("finite");
        let theta = Array1::zeros(model.layout.dim());

        // Act
        let err = model.check(&theta, &data).expect_err("length mismatch");

        // Assert
        assert!(matches!(err, OptError::ModelError { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Samples of length ≤ p + q + 10 are rejected before estimation.
    //
    // Given
    // -----
    // - GARCH(1,1) and 12 returns.
    //
    // Expect
    // ------
    // - `InsufficientData { needed: 13, found: 12, .. }`.
    fn short_sample_is_insufficient() {
        // Arrange
        let mut model = GarchModel::new(GarchSpec { p: 1, q: 1 }, GarchOptions::default(), 12);

        // Act
        let err = model.fit_values(simulated(12, 5).view()).expect_err("too short");

        // Assert
        assert!(matches!(err, GarchError::InsufficientData { needed: 13, found: 12, .. }));
    }

    #[test]
    // Purpose
    // -------
    // A fit on a moderate sample produces aligned, positive outputs and
    // resizes the buffers when needed.
    //
    // Given
    // -----
    // - A model built for 10 observations, fitted on 800 simulated returns
    //   with zero mean and scale 1.
    //
    // Expect
    // ------
    // - 800 volatilities, all > 0; ω > 0; finite ℓ; AIC < BIC (n > e²);
    //   `results` populated.
    fn fit_produces_aligned_positive_outputs() {
        // Arrange
        let options = GarchOptions { mean: MeanModel::Zero, ..GarchOptions::default() };
        let mut model = GarchModel::new(GarchSpec { p: 1, q: 1 }, options, 10);
        let returns = simulated(800, 11);

        // Act
        let fitted = model.fit_values(returns.view()).expect("fit succeeds");

        // Assert
        assert_eq!(fitted.conditional_volatility.len(), 800);
        assert_eq!(fitted.residuals.len(), 800);
        assert!(fitted.conditional_volatility.iter().all(|&v| v > 0.0));
        assert!(fitted.params.omega > 0.0);
        assert!(fitted.log_likelihood.is_finite());
        assert!(fitted.aic < fitted.bic);
        assert_eq!(fitted.param_names, vec!["omega", "alpha[1]", "beta[1]"]);
        assert!(model.results.is_some());
    }
}
