//! estimation — helpers behind [`GarchModel::fit`](super::garch::GarchModel::fit).
//!
//! Purpose
//! -------
//! Keep the fit pipeline readable by splitting out its stages: the starting
//! point, the optimizer call with its line-search retry, and the assembly of
//! a [`FittedModel`] in original units (standard errors, information
//! criteria and soft warnings included).
//!
//! Conventions
//! -----------
//! - Everything before [`assemble_fit`] works in scaled units (`y = s·r`).
//! - Under `y = s·r`: `μ_r = μ_y/s`, `ω_r = ω_y/s²`, `σ²_r = σ²_y/s²`,
//!   `ε_r = ε_y/s`, and the log-likelihood shifts by `n ln s`. α, β and ν are
//!   scale-free.
use crate::{
    inference::hessian::calc_standard_errors,
    optimization::loglik_optimizer::{LogLikelihood, OptimOutcome, Theta, maximize},
    volatility::{
        core::{
            data::GarchData,
            params::{GarchParams, ParamBounds, ParamLayout},
        },
        errors::{GarchError, GarchResult},
        models::{
            fitted::{FitWarning, FittedModel},
            garch::GarchModel,
        },
    },
};
use ndarray::Array1;
use tracing::{debug, warn};

/// Starting θ: `α_i = 0.1/p`, `β_j = 0.85/q`, `ω = 0.05·backcast`,
/// `μ = sample mean`, `ν = 8`.
///
/// With these values the implied unconditional variance equals the
/// backcast.
pub fn initial_theta(layout: &ParamLayout, bounds: &ParamBounds, data: &GarchData) -> Theta {
    let start = GarchParams {
        mu: if layout.has_mu { data.mean } else { 0.0 },
        omega: 0.05 * data.backcast,
        alpha: Array1::from_elem(layout.p, 0.1 / layout.p as f64),
        beta: Array1::from_elem(layout.q, 0.85 / layout.q as f64),
        nu: layout.has_nu.then_some(8.0),
    };
    start.to_theta(layout, bounds)
}

/// Maximize the model's likelihood from `theta0`.
///
/// A hard solver error (e.g. a line search that cannot bracket a step) is
/// retried once from the same start with the other line search. Running out
/// of iterations is not an error here; it surfaces as `converged = false`.
///
/// # Errors
/// - `OptimizationFailed` carrying the second attempt's error.
pub fn optimize(model: &GarchModel, theta0: Theta, data: &GarchData) -> GarchResult<OptimOutcome> {
    let opts = &model.options.mle_opts;
    debug!(
        spec = %model.spec,
        dim = theta0.len(),
        line_search = %opts.line_searcher,
        "starting maximum-likelihood estimation"
    );
    match maximize(model, theta0.clone(), data, opts) {
        Ok(outcome) => Ok(outcome),
        Err(first) => {
            let retry = opts.with_line_searcher(opts.line_searcher.alternate());
            warn!(
                error = %first,
                line_search = %retry.line_searcher,
                "optimizer failed; retrying with the alternate line search"
            );
            maximize(model, theta0, data, &retry)
                .map_err(|source| GarchError::OptimizationFailed { source })
        }
    }
}

/// Build the fitted-model snapshot in original units.
///
/// # Errors
/// - Parameter errors if θ̂ maps outside the admissible region.
/// - Recursion errors when re-filtering at θ̂.
pub fn assemble_fit(
    model: &GarchModel, outcome: &OptimOutcome, data: &GarchData,
) -> GarchResult<FittedModel> {
    let layout = &model.layout;
    let scale = data.scale;
    let n = data.len();
    let theta_hat = &outcome.theta_hat;

    let scaled_params = GarchParams::from_theta(theta_hat.view(), layout, &model.options.bounds)?;
    let (eps, var) = model.filter(theta_hat.view(), data)?;
    let params = scaled_params.rescaled(scale);
    let conditional_variance = var / (scale * scale);
    let conditional_volatility = conditional_variance.mapv(f64::sqrt);
    let residuals = eps / scale;

    let log_likelihood = outcome.value * n as f64 + n as f64 * scale.ln();
    let k = layout.dim();
    let (aic, bic) = information_criteria(log_likelihood, k, n);

    let std_errors = if model.options.compute_std_errors {
        standard_errors(model, theta_hat, data)
    } else {
        None
    };
    let warnings = collect_warnings(outcome, &params);
    for w in &warnings {
        warn!(warning = %w, "GARCH fit warning");
    }

    Ok(FittedModel {
        spec: model.spec,
        mean: model.options.mean,
        distribution: model.options.distribution,
        estimates: params.to_vec(layout),
        params,
        param_names: layout.names(),
        conditional_variance,
        conditional_volatility,
        residuals,
        log_likelihood,
        converged: outcome.converged,
        iterations: outcome.iterations,
        status: outcome.status.clone(),
        std_errors,
        aic,
        bic,
        warnings,
        guards: model.options.guards.rescaled(scale),
        n_obs: n,
        last_date: None,
    })
}

/// `AIC = 2k − 2ℓ`, `BIC = k ln n − 2ℓ`.
pub fn information_criteria(log_likelihood: f64, k: usize, n: usize) -> (f64, f64) {
    let k = k as f64;
    let aic = 2.0 * k - 2.0 * log_likelihood;
    let bic = k * (n as f64).ln() - 2.0 * log_likelihood;
    (aic, bic)
}

/// Standard errors in original units, or `None` when the observed
/// information is unavailable.
///
/// θ-space errors come from [`calc_standard_errors`] on the gradient of the
/// average cost; the delta method multiplies by `dx/dθ` and the result is
/// unscaled like the estimates (`μ` by `1/s`, `ω` by `1/s²`).
pub fn standard_errors(
    model: &GarchModel, theta_hat: &Theta, data: &GarchData,
) -> Option<Array1<f64>> {
    let layout = &model.layout;
    let dim = layout.dim();
    let cost_grad = |theta: &Array1<f64>| -> Array1<f64> {
        match model.grad(theta, data) {
            Ok(g) => -g,
            Err(_) => Array1::from_elem(dim, f64::NAN),
        }
    };
    let se_theta = match calc_standard_errors(&cost_grad, theta_hat, data.len()) {
        Ok(se) => se,
        Err(e) => {
            warn!(error = %e, "standard errors unavailable");
            return None;
        }
    };
    let mut se = se_theta * layout.jacobian_diag(theta_hat.view());
    let scale = data.scale;
    if let Some(i) = layout.mu_idx() {
        se[i] /= scale;
    }
    se[layout.omega_idx()] /= scale * scale;
    se.iter().all(|v| v.is_finite()).then_some(se)
}

/// Soft warnings: optimizer non-convergence and non-stationarity.
pub fn collect_warnings(outcome: &OptimOutcome, params: &GarchParams) -> Vec<FitWarning> {
    let mut warnings = Vec::new();
    if !outcome.converged {
        warnings.push(FitWarning::ConvergenceFailure {
            status: outcome.status.clone(),
            iterations: outcome.iterations,
        });
    }
    if !params.is_stationary() {
        warnings.push(FitWarning::NonStationaryFit { persistence: params.persistence() });
    }
    warnings
}
