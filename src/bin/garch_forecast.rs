//! garch_forecast — fit GARCH(p, q) to a ticker's closing prices and print
//! the in-sample volatility followed by a multi-step forecast.
//!
//! Usage:
//!   garch_forecast --ticker SPY --start 2020-01-01 --end 2024-12-31 --data-dir ./data
//!   garch_forecast --ticker SPY --start 2020-01-01 --end 2024-12-31 -p 2 -q 1 --format json
//!
//! Prices are read from `<data-dir>/<TICKER>.csv` (`date,close` columns).
//! Exit status is 1 when the pipeline reports a failure.
use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use garch_vol::pipeline::{
    CsvPriceFetcher, OutputFormat, PipelineConfig, PipelineRequest, PipelineResult, run,
};

#[derive(Parser, Debug)]
#[command(name = "garch_forecast")]
#[command(about = "GARCH(p, q) volatility estimation and forecasting from daily closes")]
#[command(version)]
struct Cli {
    /// Ticker symbol (e.g., SPY)
    #[arg(short, long)]
    ticker: String,

    /// First price date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// Last price date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,

    /// ARCH order
    #[arg(short = 'p', long, default_value_t = 1)]
    p: usize,

    /// GARCH order
    #[arg(short = 'q', long, default_value_t = 1)]
    q: usize,

    /// Forecast steps
    #[arg(long, default_value_t = 10)]
    horizon: usize,

    /// Innovation distribution: normal or student-t (overrides the config file)
    #[arg(long)]
    distribution: Option<String>,

    /// Mean model: constant or zero (overrides the config file)
    #[arg(long)]
    mean: Option<String>,

    /// Directory holding <TICKER>.csv price files
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Output format: text, csv or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Optional JSON pipeline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging and optimizer progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let request = PipelineRequest {
        ticker: cli.ticker.clone(),
        start: cli.start,
        end: cli.end,
        p: cli.p,
        q: cli.q,
        horizon: cli.horizon,
    };
    info!(
        ticker = %request.ticker,
        start = %request.start,
        end = %request.end,
        p = request.p,
        q = request.q,
        horizon = request.horizon,
        "running volatility pipeline"
    );

    let fetcher = CsvPriceFetcher::new(&cli.data_dir);
    let result = run(&request, &fetcher, &config);
    let text = cli.format.renderer().render(&result).context("failed to render result")?;
    println!("{text}");

    match result {
        PipelineResult::Success { .. } => Ok(ExitCode::SUCCESS),
        PipelineResult::Failure { .. } => Ok(ExitCode::FAILURE),
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(distribution) = &cli.distribution {
        config.distribution = distribution.clone();
    }
    if let Some(mean) = &cli.mean {
        config.mean = mean.clone();
    }
    config.verbose |= cli.verbose;
    Ok(config)
}
