//! Error types for the GARCH layer.
//!
//! [`GarchError`] covers everything from malformed price data to optimizer
//! failures; [`ParamError`] is the narrower set raised while mapping θ to
//! model parameters, which the optimizer layer converts into `OptError`.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

use crate::optimization::errors::OptError;

/// Result alias for GARCH operations.
pub type GarchResult<T> = Result<T, GarchError>;

/// Result alias for parameter construction and validation.
pub type ParamResult<T> = Result<T, ParamError>;

#[derive(Debug, Clone, PartialEq)]
pub enum GarchError {
    // ---- Data ----
    /// The fetch returned no prices for the requested ticker and range.
    NoDataFound { ticker: String },

    /// Too few observations for the requested operation.
    InsufficientData { needed: usize, found: usize, context: &'static str },

    /// Prices must be finite and strictly positive.
    InvalidPrice { index: usize, value: f64 },

    /// Dates must be strictly increasing.
    UnorderedDates { index: usize },

    /// Returns (or other inputs) must be finite.
    NonFiniteData { index: usize, value: f64 },

    // ---- Configuration ----
    /// Orders, options or request fields outside their allowed range.
    InvalidParameters { reason: String },

    /// Forecast horizon outside `[1, max]`.
    InvalidHorizon { horizon: usize, max: usize },

    /// Variance guards must be finite with `0 < min < max`.
    InvalidVarianceGuards { min: f64, max: f64, reason: &'static str },

    // ---- Estimation ----
    /// Parameter mapping failed.
    Param(ParamError),

    /// The variance recursion produced a non-finite value.
    NonFiniteVariance { t: usize, value: f64 },

    /// Non-finite value handed to a log-density.
    InvalidLogLikInput { value: f64 },

    /// The optimizer failed with a hard error on every attempted line search.
    OptimizationFailed { source: OptError },

    /// A forecast or accessor was requested before `fit`.
    ModelNotFitted,

    // ---- I/O ----
    Io { path: String, text: String },
    Parse { text: String },
}

impl std::error::Error for GarchError {}

impl std::fmt::Display for GarchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Data ----
            GarchError::NoDataFound { ticker } => {
                write!(f, "No price data found for '{ticker}'.")
            }
            GarchError::InsufficientData { needed, found, context } => {
                write!(f, "Insufficient data for {context}: need at least {needed}, found {found}.")
            }
            GarchError::InvalidPrice { index, value } => {
                write!(f, "Price at index {index} must be finite and > 0; got: {value}")
            }
            GarchError::UnorderedDates { index } => {
                write!(f, "Dates must be strictly increasing; violated at index {index}.")
            }
            GarchError::NonFiniteData { index, value } => {
                write!(f, "Data point at index {index} is non-finite: {value}")
            }

            // ---- Configuration ----
            GarchError::InvalidParameters { reason } => write!(f, "Invalid parameters: {reason}"),
            GarchError::InvalidHorizon { horizon, max } => {
                write!(f, "Forecast horizon must be between 1 and {max}; got: {horizon}")
            }
            GarchError::InvalidVarianceGuards { min, max, reason } => {
                write!(f, "Variance guards must satisfy 0 < min ({min}) < max ({max}); {reason}")
            }

            // ---- Estimation ----
            GarchError::Param(err) => write!(f, "Parameter error: {err}"),
            GarchError::NonFiniteVariance { t, value } => {
                write!(f, "Recursion produced non-finite variance at index {t}: {value}")
            }
            GarchError::InvalidLogLikInput { value } => {
                write!(f, "Log-likelihood input must be finite; got: {value}")
            }
            GarchError::OptimizationFailed { source } => {
                write!(f, "Optimization failed: {source}")
            }
            GarchError::ModelNotFitted => write!(f, "Model hasn't been fitted yet."),

            // ---- I/O ----
            GarchError::Io { path, text } => write!(f, "I/O error on '{path}': {text}"),
            GarchError::Parse { text } => write!(f, "Parse error: {text}"),
        }
    }
}

impl From<ParamError> for GarchError {
    fn from(err: ParamError) -> Self {
        GarchError::Param(err)
    }
}

impl From<OptError> for GarchError {
    fn from(err: OptError) -> Self {
        GarchError::OptimizationFailed { source: err }
    }
}

impl From<csv::Error> for GarchError {
    fn from(err: csv::Error) -> Self {
        GarchError::Parse { text: err.to_string() }
    }
}

impl From<serde_json::Error> for GarchError {
    fn from(err: serde_json::Error) -> Self {
        GarchError::Parse { text: err.to_string() }
    }
}

#[cfg(feature = "python-bindings")]
impl From<GarchError> for PyErr {
    fn from(err: GarchError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    /// θ has the wrong length for the parameter layout.
    ThetaLengthMismatch { expected: usize, actual: usize },

    /// An optimizer coordinate is NaN/±inf.
    InvalidThetaInput { index: usize, value: f64 },

    InvalidOmega { value: f64 },

    AlphaLengthMismatch { expected: usize, actual: usize },

    InvalidAlpha { index: usize, value: f64 },

    BetaLengthMismatch { expected: usize, actual: usize },

    InvalidBeta { index: usize, value: f64 },

    /// Student-t degrees of freedom must be finite and > 2.
    InvalidNu { value: f64 },

    InvalidMu { value: f64 },

    /// Lower bounds must be finite and non-negative (ω and ν strictly).
    InvalidBounds { name: &'static str, value: f64 },
}

impl std::error::Error for ParamError {}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }
            ParamError::InvalidThetaInput { index, value } => {
                write!(f, "Theta entry at index {index} must be finite; got: {value}")
            }
            ParamError::InvalidOmega { value } => {
                write!(f, "Omega must be finite and > 0; got: {value}")
            }
            ParamError::AlphaLengthMismatch { expected, actual } => {
                write!(f, "Alpha length mismatch: expected {expected}, actual {actual}")
            }
            ParamError::InvalidAlpha { index, value } => {
                write!(f, "Alpha at index {index} must be finite and >= 0; got: {value}")
            }
            ParamError::BetaLengthMismatch { expected, actual } => {
                write!(f, "Beta length mismatch: expected {expected}, actual {actual}")
            }
            ParamError::InvalidBeta { index, value } => {
                write!(f, "Beta at index {index} must be finite and >= 0; got: {value}")
            }
            ParamError::InvalidNu { value } => {
                write!(f, "Degrees of freedom must be finite and > 2; got: {value}")
            }
            ParamError::InvalidMu { value } => write!(f, "Mean must be finite; got: {value}"),
            ParamError::InvalidBounds { name, value } => {
                write!(f, "Lower bound for {name} is invalid: {value}")
            }
        }
    }
}
