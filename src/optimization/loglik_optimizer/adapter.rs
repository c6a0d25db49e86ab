//! Bridge from a [`LogLikelihood`] to argmin's `CostFunction` + `Gradient`.
//!
//! Maximizing `ℓ(θ)` becomes minimizing `c(θ) = -ℓ(θ)`. Analytic gradients
//! are negated; when the model has none, the **cost** closure is
//! finite-differenced directly so no sign flip is needed on that path.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::run_fd_diff,
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// A model plus its data, seen by argmin as a minimization problem.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    /// Central-difference gradient of the cost, retried with forward
    /// differences when a cost evaluation failed or the result is not finite.
    fn fd_gradient(&self, theta: &Theta) -> Result<Grad, Error> {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_func = |theta: &Theta| -> f64 {
            match self.cost(theta) {
                Ok(val) => val,
                Err(e) => {
                    let mut slot = closure_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    f64::NAN
                }
            }
        };
        let fd_grad = theta.central_diff(&cost_func);
        if closure_err.borrow().is_none() && validate_grad(&fd_grad, theta.len()).is_ok() {
            return Ok(fd_grad);
        }
        Ok(run_fd_diff(theta, &cost_func, &closure_err)?)
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// `c(θ) = -ℓ(θ)`; a non-finite `ℓ` is reported as `NonFiniteCost`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err(OptError::NonFiniteCost { value: output }.into());
        }
        Ok(-output)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// `-∇ℓ(θ)` when the model implements `grad`, otherwise a validated
    /// finite-difference gradient of the cost.
    ///
    /// # Errors
    /// - Any model error other than `GradientNotImplemented`.
    /// - Dimension or finiteness failures of the returned gradient.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => self.fd_gradient(theta),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Sign conventions of cost and gradient.
    // - The finite-difference fallback when `grad` is not implemented.
    // - Rejection of non-finite log-likelihood values.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = -(θ - 1)ᵀ(θ - 1), optionally with an analytic gradient.
    struct Bowl {
        analytic: bool,
    }

    impl LogLikelihood for Bowl {
        type Data = ();

        fn value(&self, theta: &Theta, _data: &()) -> OptResult<f64> {
            Ok(-theta.iter().map(|t| (t - 1.0) * (t - 1.0)).sum::<f64>())
        }

        fn check(&self, _theta: &Theta, _data: &()) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, _data: &()) -> OptResult<Grad> {
            if self.analytic {
                Ok(theta.mapv(|t| -2.0 * (t - 1.0)))
            } else {
                Err(OptError::GradientNotImplemented)
            }
        }
    }

    struct Broken;

    impl LogLikelihood for Broken {
        type Data = ();

        fn value(&self, _theta: &Theta, _data: &()) -> OptResult<f64> {
            Ok(f64::NAN)
        }

        fn check(&self, _theta: &Theta, _data: &()) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Cost and analytic gradient carry the flipped sign.
    //
    // Given
    // -----
    // - `Bowl { analytic: true }` at θ = (2, 0).
    //
    // Expect
    // ------
    // - cost = 2, gradient = (2, -2).
    fn analytic_path_negates_value_and_gradient() {
        // Arrange
        let model = Bowl { analytic: true };
        let adapter = ArgMinAdapter::new(&model, &());
        let theta = array![2.0, 0.0];

        // Act
        let cost = adapter.cost(&theta).expect("finite cost");
        let grad = adapter.gradient(&theta).expect("analytic gradient");

        // Assert
        assert_eq!(cost, 2.0);
        assert_eq!(grad, array![2.0, -2.0]);
    }

    #[test]
    // Purpose
    // -------
    // Without an analytic gradient the FD path agrees with the exact one.
    //
    // Given
    // -----
    // - `Bowl { analytic: false }` at θ = (2, 0).
    //
    // Expect
    // ------
    // - Gradient ≈ (2, -2).
    fn fd_fallback_matches_cost_gradient() {
        // Arrange
        let model = Bowl { analytic: false };
        let adapter = ArgMinAdapter::new(&model, &());
        let theta = array![2.0, 0.0];

        // Act
        let grad = adapter.gradient(&theta).expect("fd gradient");

        // Assert
        assert!((grad[0] - 2.0).abs() < 1e-5);
        assert!((grad[1] + 2.0).abs() < 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // A NaN log-likelihood becomes a typed cost error.
    //
    // Given
    // -----
    // - `Broken`, whose value is always NaN.
    //
    // Expect
    // ------
    // - `cost` fails and maps back to `OptError::NonFiniteCost`.
    fn non_finite_value_is_rejected() {
        // Arrange
        let adapter = ArgMinAdapter::new(&Broken, &());

        // Act
        let err = adapter.cost(&array![0.0]).expect_err("NaN value");

        // Assert
        assert!(matches!(OptError::from(err), OptError::NonFiniteCost { .. }));
    }
}
