//! volatility — GARCH(p, q) conditional-variance stack.
//!
//! Purpose
//! -------
//! Turn prices into log returns, fit GARCH(p, q) by maximum likelihood, and
//! forecast the conditional variance forward.
//!
//! Layout
//! ------
//! - [`core`]: data containers, the θ parameterization, the variance and
//!   sensitivity recursions, forecast recursion, guards and simulation.
//! - [`models`]: [`GarchModel`] (fitting), [`FittedModel`] and
//!   [`Forecaster`].
//! - [`errors`]: [`GarchError`] / [`ParamError`] and their result aliases.
//!
//! Conventions
//! -----------
//! - Series store the oldest observation at index 0.
//! - Lag windows inside the recursions are read newest-first so `α_1`
//!   multiplies `ε²_{t−1}` and `β_1` multiplies `σ²_{t−1}`.
//! - This layer performs no I/O. It logs through `tracing` only at fit and
//!   forecast boundaries.
pub mod core;
pub mod errors;
pub mod models;

pub use self::{
    core::{
        distribution::Distribution,
        guards::VarianceGuards,
        options::{GarchOptions, MeanModel, SimOpts},
        params::{GarchParams, ParamBounds},
        returns::{PriceSeries, ReturnSeries, compute_log_returns},
        spec::GarchSpec,
    },
    errors::{GarchError, GarchResult, ParamError, ParamResult},
    models::{FitWarning, FittedModel, ForecastSeries, Forecaster, GarchModel},
};

pub mod prelude {
    pub use super::{
        core::{
            distribution::Distribution,
            options::{GarchOptions, MeanModel},
            returns::{PriceSeries, ReturnSeries, compute_log_returns},
            spec::GarchSpec,
        },
        errors::{GarchError, GarchResult},
        models::prelude::*,
    };
}
