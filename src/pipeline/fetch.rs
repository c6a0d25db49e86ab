//! Price sources for the pipeline.
//!
//! A [`PriceFetcher`] returns the closes for a ticker over an inclusive date
//! range. "Nothing found" is an empty [`PriceSeries`], not an error; the
//! orchestrator turns it into `NoDataFound`.
use crate::volatility::{
    core::returns::PriceSeries,
    errors::{GarchError, GarchResult},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::{
    collections::HashMap,
    path::PathBuf,
};
use tracing::debug;

/// Source of daily closing prices.
pub trait PriceFetcher {
    /// Prices for `ticker` with `start ≤ date ≤ end`, oldest first.
    ///
    /// # Errors
    /// - Source-specific I/O or parse failures, and invalid price data.
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> GarchResult<PriceSeries>;
}

/// Reads `<dir>/<TICKER>.csv` files with `date,close` columns.
///
/// Dates are ISO `YYYY-MM-DD`. Extra columns are ignored and the header
/// names are matched case-insensitively for `Date`/`Close`. A missing file
/// means the ticker is unknown and yields an empty series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPriceFetcher {
    dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(alias = "Date", alias = "DATE")]
    date: NaiveDate,
    #[serde(alias = "Close", alias = "CLOSE")]
    close: f64,
}

impl CsvPriceFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvPriceFetcher { dir: dir.into() }
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker.to_uppercase()))
    }
}

impl PriceFetcher for CsvPriceFetcher {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> GarchResult<PriceSeries> {
        let path = self.path_for(ticker);
        if !path.is_file() {
            debug!(path = %path.display(), "no price file for ticker");
            return Ok(PriceSeries::empty());
        }
        let mut reader = csv::Reader::from_path(&path).map_err(|e| GarchError::Io {
            path: path.display().to_string(),
            text: e.to_string(),
        })?;
        let mut dates = Vec::new();
        let mut prices = Vec::new();
        for row in reader.deserialize::<PriceRow>() {
            let row = row?;
            if row.date >= start && row.date <= end {
                dates.push(row.date);
                prices.push(row.close);
            }
        }
        debug!(path = %path.display(), rows = dates.len(), "read price file");
        PriceSeries::new(dates, prices)
    }
}

/// Fixed map of ticker → prices, for tests and embedding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryFetcher {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `prices` under `ticker` (case-insensitive), replacing any
    /// previous entry.
    pub fn insert(&mut self, ticker: &str, prices: PriceSeries) {
        self.series.insert(ticker.to_uppercase(), prices);
    }

    pub fn with_series(mut self, ticker: &str, prices: PriceSeries) -> Self {
        self.insert(ticker, prices);
        self
    }
}

impl PriceFetcher for InMemoryFetcher {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> GarchResult<PriceSeries> {
        let Some(all) = self.series.get(&ticker.to_uppercase()) else {
            return Ok(PriceSeries::empty());
        };
        let (dates, prices): (Vec<NaiveDate>, Vec<f64>) = all
            .dates()
            .iter()
            .zip(all.prices().iter())
            .filter(|(d, _)| **d >= start && **d <= end)
            .map(|(d, p)| (*d, *p))
            .unzip();
        PriceSeries::new(dates, prices)
    }
}
