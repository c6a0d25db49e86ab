//! numerical_stability — guarded transforms and shared tolerances.
//!
//! The GARCH layer maps positive parameters through `lower + softplus(θ)`
//! and uses [`safe_logistic`] for the chain rule; `inference` uses
//! [`EIGEN_EPS`] when inverting information matrices. Nothing here logs or
//! allocates.
pub mod transformations;

pub use self::transformations::{
    EIGEN_EPS, PARAM_FLOOR, safe_logistic, safe_softplus, safe_softplus_inv,
};

pub mod prelude {
    pub use super::transformations::{
        EIGEN_EPS, PARAM_FLOOR, safe_logistic, safe_softplus, safe_softplus_inv,
    };
}
