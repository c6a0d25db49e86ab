//! Classical standard errors from the observed information matrix.
//!
//! The information matrix is the finite-difference Jacobian of a gradient
//! map (see [`compute_hessian`]); it is inverted through a symmetric
//! eigendecomposition so near-singular directions (eigenvalues at or below
//! [`EIGEN_EPS`]) are dropped instead of blowing up.
use crate::optimization::{
    errors::OptResult, loglik_optimizer::finite_diff::compute_hessian,
    numerical_stability::transformations::EIGEN_EPS,
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

/// calc_standard_errors — θ-space standard errors at an optimum.
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Gradient of the **per-observation average cost** `-ℓ(θ)/n`. Its
///   Jacobian at `theta_hat` is the average observed information `J̄`.
/// - `theta_hat`: `&Array1<f64>`
///   Maximum-likelihood estimate in optimizer coordinates.
/// - `n_obs`: `usize`
///   Number of observations behind the average; must be > 0.
///
/// Returns
/// -------
/// `OptResult<Array1<f64>>`
///   `sqrt(diag(J̄⁺) / n_obs)` where `J̄⁺` is the eigenvalue-truncated
///   pseudo-inverse. Directions with no curvature contribute nothing, so an
///   entry can be 0 when the information is singular along its axis.
///
/// Errors
/// ------
/// - Propagates [`compute_hessian`] failures (non-finite entries).
pub fn calc_standard_errors<F: Fn(&Array1<f64>) -> Array1<f64>>(
    f: &F, theta_hat: &Array1<f64>, n_obs: usize,
) -> OptResult<Array1<f64>> {
    let dim = theta_hat.len();
    let obs_info = compute_hessian(f, theta_hat)?;
    let mut obs_info_nalg = DMatrix::<f64>::zeros(dim, dim);
    fill_dmatrix(&obs_info, &mut obs_info_nalg);
    let scale = 1.0 / (n_obs.max(1) as f64);
    Ok(solve_for_se(obs_info_nalg, dim).mapv(|v| (v * scale).sqrt()))
}

// ---- Helper methods ----

fn fill_dmatrix(obs_info: &Array2<f64>, obs_info_nalg: &mut DMatrix<f64>) {
    for ((i, j), &v) in obs_info.indexed_iter() {
        obs_info_nalg[(i, j)] = v;
    }
}

/// Diagonal of the truncated pseudo-inverse, `Σ_k q_ik² / λ_k` over `λ_k > EIGEN_EPS`.
fn solve_for_se(obs_info_nalg: DMatrix<f64>, dim: usize) -> Array1<f64> {
    let eigen_decomp = obs_info_nalg.symmetric_eigen();
    let q = eigen_decomp.eigenvectors;
    let eigenvals = eigen_decomp.eigenvalues;
    Array1::from_shape_fn(dim, |i| {
        eigenvals
            .iter()
            .enumerate()
            .filter(|(_, lambda)| **lambda > EIGEN_EPS)
            .map(|(k, &lambda)| q[(i, k)] * q[(i, k)] / lambda)
            .sum()
    })
}
