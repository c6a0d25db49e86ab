//! models — user-facing GARCH(p, q) estimation and forecasting.
//!
//! Purpose
//! -------
//! Sit on top of `volatility::core` and wire the variance recursion to the
//! generic log-likelihood optimizer.
//!
//! Key behaviors
//! -------------
//! - [`GarchModel`] implements [`LogLikelihood`] (average log-likelihood and
//!   its analytic gradient in θ-space) and exposes `fit` / `fit_values`.
//! - [`estimation`] holds the fit stages: starting point, optimizer call with
//!   a line-search retry, and assembly of the [`FittedModel`] (standard
//!   errors, AIC/BIC, [`FitWarning`]s) in original units.
//! - [`Forecaster`] validates the horizon and produces a dated
//!   [`ForecastSeries`] from a fitted model.
//!
//! Invariants & assumptions
//! ------------------------
//! - Scratch buffers are sized for one sample length; `fit` reallocates them
//!   when a different length is passed.
//! - A fitted model is immutable and self-contained: forecasting needs only
//!   the [`FittedModel`] (and the fitted series for dates).
//! - Soft problems (non-convergence, non-stationarity) are warnings on the
//!   result, never errors.
//!
//! [`LogLikelihood`]: crate::optimization::loglik_optimizer::LogLikelihood
pub mod estimation;
pub mod fitted;
pub mod forecaster;
pub mod garch;

pub use self::{
    fitted::{FitWarning, FittedModel},
    forecaster::{DEFAULT_MAX_HORIZON, ForecastPoint, ForecastSeries, Forecaster},
    garch::GarchModel,
};

pub mod prelude {
    pub use super::{
        fitted::{FitWarning, FittedModel},
        forecaster::{ForecastPoint, ForecastSeries, Forecaster},
        garch::GarchModel,
    };
}
