//! Single entry point of the optimizer: [`maximize`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};

/// maximize — run L-BFGS on `ℓ(θ)` starting from `theta0`.
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Model implementing [`LogLikelihood`]; `f.check` is called once on
///   `theta0` before the solver starts.
/// - `theta0`: `Theta`
///   Starting point in unconstrained parameter space.
/// - `data`: `&F::Data`
///   Observations, borrowed for the whole run.
/// - `opts`: `&MLEOptions`
///   Tolerances, line search, memory and verbosity.
///
/// Returns
/// -------
/// `OptResult<OptimOutcome>`
///   The best θ found and `ℓ(θ̂)`. A run that stops on `max_iter` still
///   returns `Ok` with `converged = false`; the caller decides whether that
///   is acceptable.
///
/// Errors
/// ------
/// - Whatever `f.check` rejects.
/// - Builder errors for invalid tolerances.
/// - Solver failures (line search, non-finite cost) mapped into `OptError`.
///
/// Example
/// -------
/// ```ignore
/// use garch_vol::optimization::loglik_optimizer::{maximize, MLEOptions};
///
/// let outcome = maximize(&model, theta0, &data, &MLEOptions::default())?;
/// println!("ℓ = {}, converged = {}", outcome.value, outcome.converged);
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Grad, Tolerances},
    };
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - End-to-end maximization of a concave quadratic with both line searches.
    // - Rejection of a bad starting point by `check`.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = -Σ (θ_i - c_i)², maximized at θ = c.
    struct Quadratic {
        center: Theta,
    }

    impl LogLikelihood for Quadratic {
        type Data = ();

        fn value(&self, theta: &Theta, _data: &()) -> OptResult<f64> {
            Ok(-(theta - &self.center).mapv(|d| d * d).sum())
        }

        fn check(&self, theta: &Theta, _data: &()) -> OptResult<()> {
            if theta.len() != self.center.len() {
                return Err(OptError::GradientDimMismatch {
                    expected: self.center.len(),
                    found: theta.len(),
                });
            }
            Ok(())
        }

        fn grad(&self, theta: &Theta, _data: &()) -> OptResult<Grad> {
            Ok((theta - &self.center).mapv(|d| -2.0 * d))
        }
    }

    #[test]
    // Purpose
    // -------
    // Both line searches locate the maximizer of a concave quadratic.
    //
    // Given
    // -----
    // - Center `(1.5, -0.5)`, start at the origin.
    //
    // Expect
    // ------
    // - `θ̂` within 1e-4 of the center and `converged == true`.
    fn maximize_recovers_quadratic_peak_with_both_line_searches() {
        // Arrange
        let model = Quadratic { center: array![1.5, -0.5] };
        let tols = Tolerances::new(Some(1e-8), None, Some(200)).expect("valid tolerances");

        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            let opts = MLEOptions::new(tols, ls, None).expect("valid options");

            // Act
            let out = maximize(&model, array![0.0, 0.0], &(), &opts).expect("optimizer runs");

            // Assert
            assert!(out.converged, "{ls} did not converge: {}", out.status);
            assert!((out.theta_hat[0] - 1.5).abs() < 1e-4);
            assert!((out.theta_hat[1] + 0.5).abs() < 1e-4);
        }
    }

    #[test]
    // Purpose
    // -------
    // A starting point with the wrong length never reaches the solver.
    //
    // Given
    // -----
    // - A 2-parameter model and a length-3 `theta0`.
    //
    // Expect
    // ------
    // - The `check` error is returned unchanged.
    fn maximize_surfaces_check_failure() {
        // Arrange
        let model = Quadratic { center: array![0.0, 0.0] };

        // Act
        let err = maximize(&model, array![0.0, 0.0, 0.0], &(), &MLEOptions::default())
            .expect_err("length mismatch");

        // Assert
        assert_eq!(err, OptError::GradientDimMismatch { expected: 2, found: 3 });
    }
}
