//! Numeric aliases and pre-wired solver types for the optimizer.
//!
//! Everything in the optimizer speaks `ndarray` over `f64`; these aliases
//! keep argmin's generic parameters out of the rest of the crate.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Unconstrained parameter vector θ.
pub type Theta = Array1<f64>;

/// Gradient vector, same length as [`Theta`].
pub type Grad = Array1<f64>;

/// Dense `dim × dim` second-derivative matrix.
pub type Hessian = Array2<f64>;

/// Scalar objective value (the cost `c(θ) = -ℓ(θ)` inside the solver).
pub type Cost = f64;

/// Function-evaluation counters keyed by argmin's counter names
/// (`"cost_count"`, `"gradient_count"`, ...).
pub type FnEvalMap = HashMap<String, u64>;

/// Default L-BFGS history size.
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
