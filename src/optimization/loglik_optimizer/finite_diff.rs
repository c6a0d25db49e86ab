//! Finite-difference gradients and Hessians with validation.
//!
//! Purpose
//! -------
//! Wrap the `finitediff` crate so the rest of the optimizer never calls it
//! directly. Gradients are used by the adapter when a model has no analytic
//! gradient; Hessians back the observed-information standard errors in
//! `inference`.
//!
//! Conventions
//! -----------
//! - Differences are taken in unconstrained θ-space.
//! - Central differences are tried first and forward differences are the
//!   fallback whenever the central result fails validation.
//! - Closures handed to `finitediff` must return plain `f64`, so errors are
//!   parked in a `RefCell<Option<Error>>` and the closure returns `NaN`.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Forward-difference gradient of `func` at `theta`, surfacing any error the
/// closure parked in `closure_err`.
///
/// The cell is cleared on entry so a stale error from an earlier central
/// pass cannot leak into this result.
///
/// # Errors
/// - The captured closure error, converted into `OptError`.
/// - [`validate_grad`] failures (wrong length, non-finite entries).
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// compute_hessian — finite-difference Jacobian of a gradient map.
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Gradient map `θ ↦ g(θ)`. Passing the gradient of the *cost* yields the
///   observed information matrix.
/// - `theta`: `&Theta`
///   Evaluation point; its length fixes the `dim × dim` shape.
///
/// Returns
/// -------
/// `OptResult<Hessian>`
///   A finite, symmetrized matrix. The central-difference estimate is
///   returned when it validates; otherwise the forward-difference estimate
///   is validated and returned.
///
/// Errors
/// ------
/// - `OptError::HessianDimMismatch` / `OptError::InvalidHessian` when the
///   forward-difference fallback also fails validation. The central-pass
///   error is discarded.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut central = theta.central_hessian(f);
    if validate_hessian(&central, dim).is_ok() {
        symmetrize_hess(&mut central);
        return Ok(central);
    }
    let mut forward = theta.forward_hessian(f);
    validate_hessian(&forward, dim)?;
    symmetrize_hess(&mut forward);
    Ok(forward)
}

// ---- Helper methods ----

/// Average each off-diagonal pair in place; the diagonal is untouched.
fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use argmin::core::ArgminError;
    use ndarray::{Array1, Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Forward-difference gradients with and without a parked closure error.
    // - Central/forward Hessian construction, symmetry and validation.
    //
    // They intentionally DO NOT cover:
    // - The adapter's decision of when to fall back to finite differences.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A smooth objective yields the analytic gradient up to FD error.
    //
    // Given
    // -----
    // - `f(θ) = θ₀² + 3θ₁` at `θ = (1, 2)`.
    //
    // Expect
    // ------
    // - Gradient close to `(2, 3)`.
    fn run_fd_diff_matches_analytic_gradient() {
        // Arrange
        let theta: Theta = array![1.0, 2.0];
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |x: &Theta| x[0] * x[0] + 3.0 * x[1];

        // Act
        let grad = run_fd_diff(&theta, &f, &closure_err).expect("smooth objective");

        // Assert
        assert!((grad[0] - 2.0).abs() < 1e-5);
        assert!((grad[1] - 3.0).abs() < 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // An error parked by the closure wins over the (NaN) gradient.
    //
    // Given
    // -----
    // - A closure that stores `ArgminError::NotImplemented` and returns NaN.
    //
    // Expect
    // ------
    // - `Err(OptError::NotImplemented { .. })`.
    fn run_fd_diff_propagates_parked_closure_error() {
        // Arrange
        let theta: Theta = Array1::from(vec![1.0_f64]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| {
            let argmin_err = ArgminError::NotImplemented { text: "fd test".to_string() };
            closure_err.replace(Some(argmin_err.into()));
            f64::NAN
        };

        // Act
        let err = run_fd_diff(&theta, &f, &closure_err).expect_err("parked error");

        // Assert
        assert!(matches!(err, OptError::NotImplemented { .. }));
    }

    #[test]
    // Purpose
    // -------
    // The Hessian of a quadratic is recovered and symmetric.
    //
    // Given
    // -----
    // - Gradient map `g(θ) = Aθ` with `A = [[4, 1], [1, 2]]`.
    //
    // Expect
    // ------
    // - `compute_hessian` ≈ `A`, exactly symmetric.
    fn compute_hessian_recovers_quadratic_curvature() {
        // Arrange
        let a = array![[4.0, 1.0], [1.0, 2.0]];
        let grad_fn = |theta: &Theta| a.dot(theta);
        let theta: Theta = array![0.3, -0.7];

        // Act
        let hess = compute_hessian(&grad_fn, &theta).expect("linear gradient map");

        // Assert
        for ((i, j), v) in hess.indexed_iter() {
            assert!((v - a[[i, j]]).abs() < 1e-5, "entry ({i},{j}) = {v}");
        }
        assert_eq!(hess[[0, 1]], hess[[1, 0]]);
    }

    #[test]
    // Purpose
    // -------
    // A gradient map that only returns NaN fails both passes.
    //
    // Given
    // -----
    // - `g(θ) = [NaN]`.
    //
    // Expect
    // ------
    // - `Err(OptError::InvalidHessian { .. })`.
    fn compute_hessian_rejects_non_finite_entries() {
        // Arrange
        let theta: Theta = Array1::from(vec![0.0_f64]);
        let grad_fn = |_theta: &Theta| Array1::from(vec![f64::NAN]);

        // Act
        let err = compute_hessian(&grad_fn, &theta).expect_err("NaN Hessian");

        // Assert
        assert!(matches!(err, OptError::InvalidHessian { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Symmetrization averages off-diagonal pairs only.
    //
    // Given
    // -----
    // - `[[1, 2], [0, 3]]`.
    //
    // Expect
    // ------
    // - Off-diagonals become 1.0; diagonal unchanged.
    fn symmetrize_hess_averages_off_diagonal_pairs() {
        // Arrange
        let mut h: Hessian = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 0.0, 3.0])
            .expect("2x2 shape");

        // Act
        symmetrize_hess(&mut h);

        // Assert
        assert_eq!(h, array![[1.0, 1.0], [1.0, 3.0]]);
    }
}
