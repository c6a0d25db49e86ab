//! inference — standard errors for fitted models.
//!
//! Only the classical (inverse observed information) estimator is provided;
//! the GARCH estimator maps the θ-space result to parameter space with the
//! delta method.
pub mod hessian;

pub use self::hessian::calc_standard_errors;

pub mod prelude {
    pub use super::hessian::calc_standard_errors;
}
