//! optimization — numerical machinery behind maximum-likelihood fitting.
//!
//! - [`loglik_optimizer`]: L-BFGS maximization of a [`LogLikelihood`](loglik_optimizer::LogLikelihood).
//! - [`numerical_stability`]: overflow-safe transforms between constrained
//!   parameters and the unconstrained θ the optimizer sees.
//! - [`errors`]: [`OptError`](errors::OptError), shared by both.
pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
