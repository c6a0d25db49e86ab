//! Simulation of GARCH paths, used for parameter-recovery tests and demos.
use crate::volatility::{
    core::{distribution::Distribution, options::SimOpts, params::GarchParams},
    errors::{GarchError, GarchResult},
};
use ndarray::{Array1, ArrayView1, s};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution as RandDistribution, StandardNormal, StudentT};

/// A simulated return path and the conditional variances that generated it.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedPath {
    pub returns: Array1<f64>,
    pub variance: Array1<f64>,
}

/// simulate_garch — draw `n` returns from a GARCH(p, q) process.
///
/// Parameters
/// ----------
/// - `params`: `&GarchParams`
///   Data-generating parameters; `params.nu` is required for
///   [`Distribution::StudentT`].
/// - `distribution`: `Distribution`
///   Law of the standardized innovation `z_t`. Student-t draws are rescaled
///   by `sqrt((ν − 2)/ν)` to unit variance.
/// - `n`: `usize`
///   Number of returned observations (after burn-in).
/// - `opts`: `&SimOpts`
///   Seed and burn-in length.
///
/// Returns
/// -------
/// `GarchResult<SimulatedPath>`
///   `r_t = μ + σ_t z_t` with `σ²_t` from the GARCH recursion. Pre-sample
///   lags start at the unconditional variance, or at ω for a
///   non-stationary parameter set.
///
/// Errors
/// ------
/// - `InvalidParameters` when Student-t innovations are requested without a
///   valid ν.
pub fn simulate_garch(
    params: &GarchParams, distribution: Distribution, n: usize, opts: &SimOpts,
) -> GarchResult<SimulatedPath> {
    let p = params.alpha.len();
    let q = params.beta.len();
    let total = opts.burn_in + n;
    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let innovations = draw_innovations(distribution, params.nu, total, &mut rng)?;

    let start = params.unconditional_variance().unwrap_or(params.omega);
    let mut eps2 = Array1::from_elem(total + p, start);
    let mut var = Array1::from_elem(total + q, start);
    let mut returns = Array1::<f64>::zeros(total);
    for t in 0..total {
        let sigma2 = params.omega
            + params.alpha.dot(&eps2.slice(s![t..t + p; -1]))
            + params.beta.dot(&var.slice(s![t..t + q; -1]));
        let eps = sigma2.sqrt() * innovations[t];
        var[q + t] = sigma2;
        eps2[p + t] = eps * eps;
        returns[t] = params.mu + eps;
    }
    Ok(SimulatedPath {
        returns: returns.slice(s![opts.burn_in..]).to_owned(),
        variance: var.slice(s![q + opts.burn_in..]).to_owned(),
    })
}

/// Price path `P_0 · exp(cumsum r)` with `start` prepended, so the result is
/// one element longer than `returns`.
pub fn price_path(start: f64, returns: ArrayView1<f64>) -> Array1<f64> {
    let mut prices = Vec::with_capacity(returns.len() + 1);
    prices.push(start);
    let mut level = start;
    for r in returns.iter() {
        level *= r.exp();
        prices.push(level);
    }
    Array1::from(prices)
}

// ---- Helper methods ----

fn draw_innovations(
    distribution: Distribution, nu: Option<f64>, n: usize, rng: &mut StdRng,
) -> GarchResult<Array1<f64>> {
    match distribution {
        Distribution::Normal => {
            Ok((0..n).map(|_| RandDistribution::<f64>::sample(&StandardNormal, rng)).collect())
        }
        Distribution::StudentT => {
            let nu = nu.filter(|v| v.is_finite() && *v > 2.0).ok_or_else(|| {
                GarchError::InvalidParameters {
                    reason: "Student-t simulation requires nu > 2".to_string(),
                }
            })?;
            let law = StudentT::new(nu).map_err(|e| GarchError::InvalidParameters {
                reason: format!("Student-t degrees of freedom {nu}: {e}"),
            })?;
            let unit = ((nu - 2.0) / nu).sqrt();
            Ok((0..n).map(|_| law.sample(rng) * unit).collect())
        }
    }
}
