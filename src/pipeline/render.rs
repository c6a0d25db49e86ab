//! Output formats for a [`PipelineResult`].
//!
//! Every renderer prints a `Failure` as the single line `Error: <reason>`.
use crate::{
    pipeline::orchestrator::{FitDiagnostics, HistoricalPoint, ParamEstimate, PipelineResult},
    volatility::{
        core::spec::GarchSpec,
        errors::{GarchError, GarchResult},
        models::{fitted::FitWarning, forecaster::ForecastSeries},
    },
};
use std::{
    fmt::{self, Write as _},
    str::FromStr,
};

/// Turns a pipeline result into text.
pub trait Renderer {
    /// # Errors
    /// - `Parse` when serialization fails.
    fn render(&self, result: &PipelineResult) -> GarchResult<String>;
}

/// Selectable output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn renderer(&self) -> Box<dyn Renderer> {
        match self {
            OutputFormat::Text => Box::new(TextRenderer),
            OutputFormat::Csv => Box::new(CsvRenderer),
            OutputFormat::Json => Box::new(JsonRenderer { pretty: true }),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = GarchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(GarchError::InvalidParameters {
                reason: format!("unknown output format '{s}'; expected text, csv or json"),
            }),
        }
    }
}

/// Summary block, then one row per date: historical rows, a marker line at
/// the forecast start, and forecast rows tagged `forecast`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, result: &PipelineResult) -> GarchResult<String> {
        let PipelineResult::Success {
            ticker, spec, historical, forecast, params, diagnostics, warnings
        } = result
        else {
            return Ok(failure_line(result));
        };
        let mut out = String::new();
        write_text(&mut out, ticker, spec, params, diagnostics, warnings)
            .and_then(|()| write_table(&mut out, historical, forecast))
            .map_err(fmt_error)?;
        Ok(out)
    }
}

/// `date,kind,volatility` rows, historical first.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl Renderer for CsvRenderer {
    fn render(&self, result: &PipelineResult) -> GarchResult<String> {
        let PipelineResult::Success { historical, forecast, .. } = result else {
            return Ok(failure_line(result));
        };
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["date", "kind", "volatility"])?;
        for point in historical {
            writer.write_record([
                point.date.to_string(),
                "historical".to_string(),
                point.volatility.to_string(),
            ])?;
        }
        for point in &forecast.points {
            writer.write_record([
                point.date.to_string(),
                "forecast".to_string(),
                point.volatility.to_string(),
            ])?;
        }
        let bytes = writer.into_inner().map_err(|e| GarchError::Parse { text: e.to_string() })?;
        String::from_utf8(bytes).map_err(|e| GarchError::Parse { text: e.to_string() })
    }
}

/// The whole result as JSON (`"status": "success"` plus its fields).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl Renderer for JsonRenderer {
    fn render(&self, result: &PipelineResult) -> GarchResult<String> {
        if !result.is_success() {
            return Ok(failure_line(result));
        }
        let text = if self.pretty {
            serde_json::to_string_pretty(result)?
        } else {
            serde_json::to_string(result)?
        };
        Ok(text)
    }
}

// ---- Helper methods ----

fn failure_line(result: &PipelineResult) -> String {
    match result {
        PipelineResult::Failure { reason, .. } => format!("Error: {reason}"),
        PipelineResult::Success { .. } => String::new(),
    }
}

fn fmt_error(err: fmt::Error) -> GarchError {
    GarchError::Parse { text: format!("failed to format text output: {err}") }
}

fn write_text(
    out: &mut String, ticker: &str, spec: &GarchSpec, params: &[ParamEstimate],
    diagnostics: &FitDiagnostics, warnings: &[FitWarning],
) -> fmt::Result {
    writeln!(out, "{spec} volatility for {ticker}")?;
    write_params(out, params)?;
    write_diagnostics(out, diagnostics)?;
    for w in warnings {
        writeln!(out, "warning: {w}")?;
    }
    writeln!(out)
}

fn write_table(
    out: &mut String, historical: &[HistoricalPoint], forecast: &ForecastSeries,
) -> fmt::Result {
    writeln!(out, "{:<12} {:>14}  kind", "date", "volatility")?;
    for point in historical {
        writeln!(out, "{:<12} {:>14.8}  historical", point.date, point.volatility)?;
    }
    if let Some(last) = historical.last() {
        writeln!(out, "---- forecast start (after {}) ----", last.date)?;
    }
    for point in &forecast.points {
        writeln!(out, "{:<12} {:>14.8}  forecast", point.date, point.volatility)?;
    }
    Ok(())
}

fn write_params(out: &mut String, params: &[ParamEstimate]) -> fmt::Result {
    writeln!(out, "{:<10} {:>14} {:>14}", "param", "estimate", "std.err")?;
    for p in params {
        let se = p.std_error.map_or_else(|| "n/a".to_string(), |se| format!("{se:.6e}"));
        writeln!(out, "{:<10} {:>14.6e} {:>14}", p.name, p.value, se)?;
    }
    Ok(())
}

fn write_diagnostics(out: &mut String, d: &FitDiagnostics) -> fmt::Result {
    writeln!(
        out,
        "log-likelihood {:.4}  AIC {:.4}  BIC {:.4}  k = {}  n = {}",
        d.log_likelihood, d.aic, d.bic, d.num_params, d.n_obs
    )?;
    writeln!(
        out,
        "persistence {:.4}  converged {} after {} iterations",
        d.persistence, d.converged, d.iterations
    )
}
