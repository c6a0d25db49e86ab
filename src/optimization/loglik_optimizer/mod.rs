//! loglik_optimizer — argmin-backed maximizer for log-likelihoods.
//!
//! Purpose
//! -------
//! Models implement [`LogLikelihood`] and call [`maximize`]; this module
//! turns `ℓ(θ)` into an argmin cost `c(θ) = -ℓ(θ)`, builds an L-BFGS solver
//! with the requested line search, runs it and returns an [`OptimOutcome`].
//!
//! Layout
//! ------
//! - [`adapter`]: `CostFunction`/`Gradient` bridge with a finite-difference
//!   fallback.
//! - [`builders`]: solver construction per line search.
//! - [`run`]: executor setup and result normalization.
//! - [`finite_diff`]: FD gradients and Hessians, also used by `inference`.
//! - [`traits`], [`types`], [`validation`]: public surface, aliases, checks.
//!
//! Invariants
//! ----------
//! - Models supply `ℓ` and `∇ℓ`, never the cost.
//! - Every gradient or Hessian leaving this module has been validated as
//!   finite and correctly shaped.
pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
