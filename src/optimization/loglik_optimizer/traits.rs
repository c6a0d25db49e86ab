//! Public optimizer surface: the [`LogLikelihood`] trait models implement,
//! the options that steer L-BFGS, and the [`OptimOutcome`] handed back.
//!
//! Convention: callers *maximize* `ℓ(θ)`; the solver minimizes `c(θ) = -ℓ(θ)`.
//! An analytic gradient, when provided, is `∇ℓ(θ)`; the adapter flips signs.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// User-implemented log-likelihood.
///
/// - `value(θ, data)` evaluates `ℓ(θ)`; invalid inputs are reported as
///   [`OptError`], never as panics.
/// - `check(θ, data)` runs once before optimization and should reject
///   malformed starting points (wrong length, NaN entries).
/// - `grad(θ, data)` is optional. Without it the adapter falls back to
///   finite differences of the cost.
pub trait LogLikelihood {
    type Data: 'static;

    // Required methods
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Line search used inside L-BFGS.
///
/// Parses case-insensitively from `"MoreThuente"` / `"HagerZhang"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl LineSearcher {
    /// The other line search; used when a run has to be retried.
    pub fn alternate(self) -> Self {
        match self {
            LineSearcher::MoreThuente => LineSearcher::HagerZhang,
            LineSearcher::HagerZhang => LineSearcher::MoreThuente,
        }
    }
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

impl std::fmt::Display for LineSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineSearcher::MoreThuente => write!(f, "MoreThuente"),
            LineSearcher::HagerZhang => write!(f, "HagerZhang"),
        }
    }
}

/// Optimizer-level configuration.
///
/// - `tols`: stopping rules (see [`Tolerances`]).
/// - `line_searcher`: line search used by L-BFGS.
/// - `verbose`: attach argmin's terminal observer (requires the `obs_slog`
///   feature; ignored otherwise).
/// - `lbfgs_mem`: history size, `None` means [`DEFAULT_LBFGS_MEM`](super::DEFAULT_LBFGS_MEM).
///
/// The default is `tol_grad = 1e-7`, `tol_cost = 1e-12`, `max_iter = 500`,
/// More–Thuente, quiet, default memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl MLEOptions {
    /// Bundle validated tolerances with solver choices.
    ///
    /// # Errors
    /// - [`OptError::InvalidLBFGSMem`] when `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(0) = lbfgs_mem {
            return Err(OptError::InvalidLBFGSMem {
                mem: 0,
                reason: "L-BFGS memory must be greater than zero.",
            });
        }
        Ok(Self { tols, line_searcher, verbose: false, lbfgs_mem })
    }

    /// Builder-style switch for the progress observer.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Copy of these options using a different line search.
    pub fn with_line_searcher(&self, line_searcher: LineSearcher) -> Self {
        Self { line_searcher, ..self.clone() }
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-7), tol_cost: Some(1e-12), max_iter: Some(500) },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Stopping rules for the solver.
///
/// - `tol_grad`: stop when the gradient norm drops below this value.
/// - `tol_cost`: stop when the change in cost drops below this value.
/// - `max_iter`: hard cap on iterations.
///
/// At least one must be `Some`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == Some(0)`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(0) = max_iter {
            return Err(OptError::InvalidMaxIter {
                max_iter: 0,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Normalized result of [`maximize`](super::maximize).
///
/// - `theta_hat`: best θ found.
/// - `value`: `ℓ(θ̂)` (the log-likelihood, not the cost).
/// - `converged`: `true` only when the solver met one of its tolerances.
///   Hitting `max_iter` or being interrupted leaves it `false`.
/// - `status`: argmin's termination status as text.
/// - `iterations`, `fn_evals`: solver bookkeeping.
/// - `grad_norm`: norm of the last gradient, when argmin kept one.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated outcome from raw solver state.
    ///
    /// # Errors
    /// - Propagates [`validate_theta_hat`] and [`validate_value`] failures.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let converged = matches!(
            termination,
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached
            )
        );
        let status = match &termination {
            TerminationStatus::NotTerminated => "Not terminated".to_string(),
            TerminationStatus::Terminated(reason) => reason.text().to_string(),
        };
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation rules of `Tolerances::new` and `MLEOptions::new`.
    // - Parsing of `LineSearcher`.
    // - The mapping from argmin termination status to `converged`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // At least one stopping rule is required.
    //
    // Given
    // -----
    // - All three tolerances set to `None`.
    //
    // Expect
    // ------
    // - `OptError::NoTolerancesProvided`.
    fn tolerances_new_requires_a_stopping_rule() {
        // Act
        let res = Tolerances::new(None, None, None);

        // Assert
        assert_eq!(res, Err(OptError::NoTolerancesProvided));
    }

    #[test]
    // Purpose
    // -------
    // A zero iteration cap and zero L-BFGS memory are rejected.
    //
    // Given
    // -----
    // - `max_iter = Some(0)` and `lbfgs_mem = Some(0)`.
    //
    // Expect
    // ------
    // - `InvalidMaxIter` and `InvalidLBFGSMem` respectively.
    fn zero_iteration_cap_and_zero_memory_are_rejected() {
        // Act
        let tols = Tolerances::new(Some(1e-6), None, Some(0));
        let opts = MLEOptions::new(
            Tolerances::new(Some(1e-6), None, Some(10)).expect("valid tolerances"),
            LineSearcher::HagerZhang,
            Some(0),
        );

        // Assert
        assert!(matches!(tols, Err(OptError::InvalidMaxIter { .. })));
        assert!(matches!(opts, Err(OptError::InvalidLBFGSMem { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Line-search names parse regardless of case and separators.
    //
    // Given
    // -----
    // - `"hager-zhang"`, `"MORETHUENTE"`, and `"bfgs"`.
    //
    // Expect
    // ------
    // - The first two parse; the last is `InvalidLineSearch`.
    fn line_searcher_parses_case_insensitively() {
        // Act / Assert
        assert_eq!("hager-zhang".parse::<LineSearcher>(), Ok(LineSearcher::HagerZhang));
        assert_eq!("MORETHUENTE".parse::<LineSearcher>(), Ok(LineSearcher::MoreThuente));
        assert!(matches!(
            "bfgs".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
        assert_eq!(LineSearcher::MoreThuente.alternate(), LineSearcher::HagerZhang);
    }

    #[test]
    // Purpose
    // -------
    // Reaching the iteration cap is not convergence.
    //
    // Given
    // -----
    // - Termination reasons `SolverConverged` and `MaxItersReached`.
    //
    // Expect
    // ------
    // - `converged` is `true` only for `SolverConverged`.
    fn outcome_marks_max_iters_as_not_converged() {
        // Arrange
        let ok = TerminationStatus::Terminated(TerminationReason::SolverConverged);
        let capped = TerminationStatus::Terminated(TerminationReason::MaxItersReached);

        // Act
        let a = OptimOutcome::new(Some(array![0.5]), -1.0, ok, 12, FnEvalMap::new(), None)
            .expect("valid outcome");
        let b = OptimOutcome::new(Some(array![0.5]), -1.0, capped, 500, FnEvalMap::new(), None)
            .expect("valid outcome");

        // Assert
        assert!(a.converged);
        assert!(!b.converged);
        assert_eq!(b.iterations, 500);
    }
}
