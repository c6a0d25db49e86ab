//! Python-boundary helpers: array extraction and model construction from
//! keyword arguments.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyTypeError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::loglik_optimizer::traits::{LineSearcher, MLEOptions, Tolerances},
    volatility::{
        core::{
            distribution::Distribution, guards::VarianceGuards, options::GarchOptions,
            options::MeanModel, params::ParamBounds, spec::GarchSpec,
        },
        errors::GarchError,
        models::garch::GarchModel,
    },
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

/// Accepts a contiguous `numpy.ndarray`, anything with `.to_numpy()` (pandas),
/// or a plain sequence of floats.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Builds a [`GarchModel`] from the Python constructor arguments; `None`
/// falls back to the Rust defaults (GARCH(1,1), constant mean, normal
/// errors, scale 1).
#[cfg(feature = "python-bindings")]
pub fn build_garch_model(
    data_length: usize, p: Option<usize>, q: Option<usize>, mean: Option<&str>,
    distribution: Option<&str>, scale: Option<f64>, tol_grad: Option<f64>,
    tol_cost: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
    lbfgs_mem: Option<usize>, variance_guards: Option<(f64, f64)>,
) -> PyResult<GarchModel> {
    let spec = GarchSpec::new(p.unwrap_or(1), q.unwrap_or(1))?;
    let mean: MeanModel = mean.unwrap_or("constant").parse()?;
    let distribution: Distribution = distribution.unwrap_or("normal").parse()?;
    let mle_opts = extract_mle_opts(tol_grad, tol_cost, max_iter, line_searcher, lbfgs_mem)?;
    let guards = match variance_guards {
        Some(bounds) => VarianceGuards::new(bounds)?,
        None => VarianceGuards::default(),
    };
    let options = GarchOptions::new(
        mean,
        distribution,
        mle_opts,
        guards,
        ParamBounds::default(),
        scale.unwrap_or(1.0),
        true,
    )?;
    Ok(GarchModel::new(spec, options, data_length))
}

#[cfg(feature = "python-bindings")]
fn extract_mle_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
) -> PyResult<MLEOptions> {
    let invalid = |e: crate::optimization::errors::OptError| GarchError::InvalidParameters {
        reason: e.to_string(),
    };
    let tols = match (tol_grad, tol_cost, max_iter) {
        (None, None, None) => MLEOptions::default().tols,
        _ => Tolerances::new(tol_grad, tol_cost, max_iter).map_err(invalid)?,
    };
    let ls = match line_searcher {
        Some(name) => name.parse::<LineSearcher>().map_err(invalid)?,
        None => LineSearcher::MoreThuente,
    };
    Ok(MLEOptions::new(tols, ls, lbfgs_mem).map_err(invalid)?)
}
