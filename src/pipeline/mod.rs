//! pipeline — request-scoped price → forecast workflow.
//!
//! - [`config`]: limits and estimation settings, loadable from JSON.
//! - [`fetch`]: the [`PriceFetcher`] seam with CSV and in-memory sources.
//! - [`orchestrator`]: [`run`], which validates, fetches, fits and
//!   forecasts, and converts every error into a [`PipelineResult::Failure`].
//! - [`render`]: text, CSV and JSON output.
pub mod config;
pub mod fetch;
pub mod orchestrator;
pub mod render;

pub use self::{
    config::PipelineConfig,
    fetch::{CsvPriceFetcher, InMemoryFetcher, PriceFetcher},
    orchestrator::{FailureKind, PipelineRequest, PipelineResult, run},
    render::{CsvRenderer, JsonRenderer, OutputFormat, Renderer, TextRenderer},
};
