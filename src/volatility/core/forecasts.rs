//! Multi-step conditional-variance forecasts.
use crate::volatility::{
    core::{guards::VarianceGuards, params::GarchParams},
    errors::{GarchError, GarchResult},
};
use ndarray::{Array1, ArrayView1, s};
use std::cmp::min;

/// forecast_recursion — iterate the GARCH recursion `horizon` steps past the
/// sample.
///
/// Parameters
/// ----------
/// - `params`: `&GarchParams`
///   Fitted parameters, in the same units as the lags.
/// - `eps2_lags`: `ArrayView1<f64>`
///   The last `p` squared residuals, oldest first (`ε²_{T−p+1}, …, ε²_T`).
/// - `var_lags`: `ArrayView1<f64>`
///   The last `q` conditional variances, oldest first.
/// - `horizon`: `usize`
///   Number of steps; 0 yields an empty path.
/// - `guards`: `&VarianceGuards`
///   Clamp applied to every forecast.
///
/// Returns
/// -------
/// `GarchResult<Array1<f64>>`
///   `σ̂²_{T+1}, …, σ̂²_{T+h}`. Lags that fall after `T` use the forecast
///   variance in place of both ε² (its conditional expectation) and σ².
///
/// Errors
/// ------
/// - `InvalidParameters` when the lag windows do not match `(p, q)`.
pub fn forecast_recursion(
    params: &GarchParams, eps2_lags: ArrayView1<f64>, var_lags: ArrayView1<f64>, horizon: usize,
    guards: &VarianceGuards,
) -> GarchResult<Array1<f64>> {
    let alpha = &params.alpha;
    let beta = &params.beta;
    let p = alpha.len();
    let q = beta.len();
    if eps2_lags.len() != p || var_lags.len() != q {
        return Err(GarchError::InvalidParameters {
            reason: format!(
                "forecast needs {p} squared-residual and {q} variance lags; got {} and {}",
                eps2_lags.len(),
                var_lags.len()
            ),
        });
    }
    let mut forecast = Array1::<f64>::zeros(horizon);
    for i in 0..horizon {
        let alpha_fc_len = min(i, p);
        let alpha_obs_len = p - alpha_fc_len;
        let beta_fc_len = min(i, q);
        let beta_obs_len = q - beta_fc_len;

        let alpha_fc_rev = forecast.slice(s![i - alpha_fc_len..i; -1]);
        let eps2_obs_rev = eps2_lags.slice(s![p - alpha_obs_len..p; -1]);
        let beta_fc_rev = forecast.slice(s![i - beta_fc_len..i; -1]);
        let var_obs_rev = var_lags.slice(s![q - beta_obs_len..q; -1]);

        let sum_alpha = alpha.slice(s![..alpha_fc_len]).dot(&alpha_fc_rev)
            + alpha.slice(s![alpha_fc_len..]).dot(&eps2_obs_rev);
        let sum_beta = beta.slice(s![..beta_fc_len]).dot(&beta_fc_rev)
            + beta.slice(s![beta_fc_len..]).dot(&var_obs_rev);
        let (value, _) = guards.clamp(params.omega + sum_alpha + sum_beta);
        forecast[i] = value;
    }
    Ok(forecast)
}
