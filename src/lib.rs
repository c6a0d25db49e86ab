//! garch_vol — GARCH(p, q) volatility estimation and forecasting.
//!
//! Purpose
//! -------
//! Provide the crate root for the volatility pipeline: price series are
//! turned into log returns, a GARCH(p, q) model is fitted by maximum
//! likelihood, and its conditional variance is projected forward. The same
//! core is reachable from Rust, from the `garch_forecast` command-line tool,
//! and (behind the `python-bindings` feature) from Python.
//!
//! Key behaviors
//! -------------
//! - Re-export the numerical layers: [`volatility`] (returns, model, fit,
//!   forecast), [`optimization`] (L-BFGS driver on top of `argmin`) and
//!   [`inference`] (observed-information standard errors).
//! - Host the [`pipeline`] orchestrator that wires a price source, the
//!   estimator and the forecaster into one request/response call.
//! - Define the `#[pyclass]` wrapper and the `#[pymodule]` initializer for
//!   the `_garch_vol` Python extension.
//!
//! Invariants & assumptions
//! ------------------------
//! - All heavy numerical work lives in the inner modules; this file performs
//!   only FFI glue, input conversion and error mapping.
//! - Errors from core code are rich Rust enums internally and are turned
//!   into `ValueError` at the PyO3 boundary.
//!
//! Conventions
//! -----------
//! - Series are ordered oldest first.
//! - Parameters are reported in the units of the input returns, whatever
//!   internal scaling the fit used.
//!
//! Downstream usage
//! ----------------
//! - Rust callers use [`volatility::GarchModel`] and
//!   [`volatility::Forecaster`] directly, or [`pipeline::run`] for the
//!   full fetch → fit → forecast flow.
//! - The PyO3 items below are internal plumbing for the Python package.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and
//!   by `tests/integration_garch_pipeline.rs`.

pub mod inference;
pub mod optimization;
pub mod pipeline;
pub mod utils;
pub mod volatility;

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    utils::{build_garch_model, extract_f64_array},
    volatility::{
        core::returns::log_returns_from_slice,
        errors::GarchError,
        models::{fitted::FittedModel, forecaster::Forecaster, garch::GarchModel},
    },
};

/// GARCH — Python-facing wrapper around [`GarchModel`].
///
/// Purpose
/// -------
/// Fit a GARCH(p, q) model to a return series handed over from Python and
/// expose the estimates, diagnostics and variance forecasts.
///
/// Parameters
/// ----------
/// Constructed from Python via `GARCH(data_length, p=1, q=1, ...)`:
/// - `data_length`: `usize`
///   Expected sample length; sizes the scratch buffers (a different length
///   at `fit` time reallocates them).
/// - `mean`: `'constant'` or `'zero'`.
/// - `distribution`: `'normal'` or `'student-t'`.
/// - `scale`: multiplier applied to returns before fitting.
/// - `tol_grad`, `tol_cost`, `max_iter`, `line_searcher`, `lbfgs_mem`
///   Optimizer settings forwarded to `MLEOptions`.
/// - `variance_guards`: optional `(floor, ceiling)` for σ².
///
/// Fields
/// ------
/// - `inner`: the configured [`GarchModel`].
/// - `fitted`: the last successful fit, `None` before `fit`.
/// - `max_horizon`: upper limit for `forecast`.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "garch_vol.volatility", unsendable)]
pub struct GARCH {
    pub inner: GarchModel,
    pub fitted: Option<FittedModel>,
    pub max_horizon: usize,
}

#[cfg(feature = "python-bindings")]
impl GARCH {
    fn fitted_ref(&self) -> PyResult<&FittedModel> {
        self.fitted.as_ref().ok_or_else(|| GarchError::ModelNotFitted.into())
    }
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl GARCH {
    #[new]
    #[pyo3(
        signature = (
            data_length,
            p = None,
            q = None,
            mean = None,
            distribution = None,
            scale = None,
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            line_searcher = None,
            lbfgs_mem = None,
            variance_guards = None,
            max_horizon = None,
        ),
        text_signature = "(data_length, /, p=1, q=1, mean='constant', distribution='normal', \
                          scale=1.0, tol_grad=None, tol_cost=None, max_iter=None, \
                          line_searcher='MoreThuente', lbfgs_mem=None, variance_guards=None, \
                          max_horizon=30)"
    )]
    pub fn new(
        data_length: usize, p: Option<usize>, q: Option<usize>, mean: Option<&str>,
        distribution: Option<&str>, scale: Option<f64>, tol_grad: Option<f64>,
        tol_cost: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
        lbfgs_mem: Option<usize>, variance_guards: Option<(f64, f64)>,
        max_horizon: Option<usize>,
    ) -> PyResult<Self> {
        let inner = build_garch_model(
            data_length,
            p,
            q,
            mean,
            distribution,
            scale,
            tol_grad,
            tol_cost,
            max_iter,
            line_searcher,
            lbfgs_mem,
            variance_guards,
        )?;
        let max_horizon = max_horizon.unwrap_or(Forecaster::default().max_horizon);
        Ok(GARCH { inner, fitted: None, max_horizon })
    }

    #[pyo3(text_signature = "(self, returns, /)")]
    pub fn fit<'py>(&mut self, py: Python<'py>, returns: &Bound<'py, PyAny>) -> PyResult<()> {
        let arr = extract_f64_array(py, returns)?;
        let values = arr.as_array();
        let fitted = self.inner.fit_values(values)?;
        self.fitted = Some(fitted);
        Ok(())
    }

    /// Variance path `σ̂²_{T+1..T+h}`.
    #[pyo3(text_signature = "(self, horizon, /)")]
    pub fn forecast(&self, horizon: usize) -> PyResult<Vec<f64>> {
        let fitted = self.fitted_ref()?;
        let path = Forecaster::new(self.max_horizon).forecast_path(fitted, horizon)?;
        Ok(path.to_vec())
    }

    #[getter]
    pub fn mu(&self) -> PyResult<f64> {
        Ok(self.fitted_ref()?.params.mu)
    }

    #[getter]
    pub fn omega(&self) -> PyResult<f64> {
        Ok(self.fitted_ref()?.params.omega)
    }

    #[getter]
    pub fn alpha(&self) -> PyResult<Vec<f64>> {
        Ok(self.fitted_ref()?.params.alpha.to_vec())
    }

    #[getter]
    pub fn beta(&self) -> PyResult<Vec<f64>> {
        Ok(self.fitted_ref()?.params.beta.to_vec())
    }

    #[getter]
    pub fn nu(&self) -> PyResult<Option<f64>> {
        Ok(self.fitted_ref()?.params.nu)
    }

    #[getter]
    pub fn persistence(&self) -> PyResult<f64> {
        Ok(self.fitted_ref()?.params.persistence())
    }

    #[getter]
    pub fn log_likelihood(&self) -> PyResult<f64> {
        Ok(self.fitted_ref()?.log_likelihood)
    }

    #[getter]
    pub fn aic(&self) -> PyResult<f64> {
        Ok(self.fitted_ref()?.aic)
    }

    #[getter]
    pub fn bic(&self) -> PyResult<f64> {
        Ok(self.fitted_ref()?.bic)
    }

    #[getter]
    pub fn converged(&self) -> PyResult<bool> {
        Ok(self.fitted_ref()?.converged)
    }

    #[getter]
    pub fn param_names(&self) -> PyResult<Vec<String>> {
        Ok(self.fitted_ref()?.param_names.clone())
    }

    #[getter]
    pub fn std_errors(&self) -> PyResult<Option<Vec<f64>>> {
        Ok(self.fitted_ref()?.std_errors.as_ref().map(Array1::to_vec))
    }

    #[getter]
    pub fn conditional_volatility(&self) -> PyResult<Vec<f64>> {
        Ok(self.fitted_ref()?.conditional_volatility.to_vec())
    }

    #[getter]
    pub fn warnings(&self) -> PyResult<Vec<String>> {
        Ok(self.fitted_ref()?.warnings.iter().map(ToString::to_string).collect())
    }
}

/// `ln(P_t / P_{t−1})` for a price vector; one element shorter than the input.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(text_signature = "(prices, /)")]
pub fn log_returns<'py>(py: Python<'py>, prices: &Bound<'py, PyAny>) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, prices)?;
    let values = log_returns_from_slice(arr.as_array())?;
    Ok(values.to_vec())
}

/// Python module initializer.
///
/// Registers the `volatility` submodule under `garch_vol` and adds it to
/// `sys.modules` so `from garch_vol.volatility import GARCH` works.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _garch_vol<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let volatility_mod = PyModule::new(_py, "volatility")?;
    volatility_mod.add_class::<GARCH>()?;
    volatility_mod.add_function(wrap_pyfunction!(log_returns, &volatility_mod)?)?;
    m.add_submodule(&volatility_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("garch_vol.volatility", volatility_mod)?;
    Ok(())
}
