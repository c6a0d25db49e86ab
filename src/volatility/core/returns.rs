//! Price and return series plus the log-return transform.
//!
//! Both series keep dates and values side by side and validate on
//! construction, so everything downstream can assume strictly increasing
//! dates and finite values (prices additionally strictly positive).
use crate::volatility::errors::{GarchError, GarchResult};
use chrono::NaiveDate;
use ndarray::{Array1, ArrayView1};

/// Ordered `(date, close)` observations with finite, strictly positive prices.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    prices: Array1<f64>,
}

impl PriceSeries {
    /// Validate and wrap a price series. An empty series is allowed; it
    /// represents "no data" and is rejected by the consumers that need data.
    ///
    /// # Errors
    /// - `InvalidParameters` when `dates` and `prices` differ in length.
    /// - `UnorderedDates` at the first date not strictly after its predecessor.
    /// - `InvalidPrice` for the first non-finite or non-positive price.
    pub fn new(dates: Vec<NaiveDate>, prices: Vec<f64>) -> GarchResult<Self> {
        check_lengths(dates.len(), prices.len())?;
        check_dates(&dates)?;
        if let Some(index) = prices.iter().position(|p| !p.is_finite() || *p <= 0.0) {
            return Err(GarchError::InvalidPrice { index, value: prices[index] });
        }
        Ok(PriceSeries { dates, prices: Array1::from(prices) })
    }

    pub fn empty() -> Self {
        PriceSeries { dates: Vec::new(), prices: Array1::zeros(0) }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn prices(&self) -> ArrayView1<'_, f64> {
        self.prices.view()
    }
}

/// Ordered `(date, log-return)` observations with finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    dates: Vec<NaiveDate>,
    values: Array1<f64>,
}

impl ReturnSeries {
    /// # Errors
    /// - `InvalidParameters` on a length mismatch.
    /// - `UnorderedDates` for non-increasing dates.
    /// - `NonFiniteData` for the first NaN/±inf value.
    pub fn new(dates: Vec<NaiveDate>, values: Array1<f64>) -> GarchResult<Self> {
        check_lengths(dates.len(), values.len())?;
        check_dates(&dates)?;
        check_finite(values.view())?;
        Ok(ReturnSeries { dates, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Sample mean; 0 for an empty series.
    pub fn mean(&self) -> f64 {
        self.values.mean().unwrap_or(0.0)
    }

    /// Population variance about the sample mean (divisor `n`).
    pub fn sample_variance(&self) -> f64 {
        sample_variance(self.values.view())
    }
}

/// compute_log_returns — `r_t = ln(P_t / P_{t-1})`, dated at `t`.
///
/// Parameters
/// ----------
/// - `prices`: `&PriceSeries`
///   Validated prices with at least two observations.
///
/// Returns
/// -------
/// `GarchResult<ReturnSeries>`
///   One element shorter than `prices`; the first date is dropped because
///   its return is undefined.
///
/// Errors
/// ------
/// - `InsufficientData` for fewer than two prices.
pub fn compute_log_returns(prices: &PriceSeries) -> GarchResult<ReturnSeries> {
    let values = log_returns_from_slice(prices.prices())?;
    let dates = prices.dates()[1..].to_vec();
    ReturnSeries::new(dates, values)
}

/// Undated variant of [`compute_log_returns`] for raw price vectors.
///
/// # Errors
/// - `InsufficientData` for fewer than two prices.
/// - `InvalidPrice` for the first non-finite or non-positive price.
pub fn log_returns_from_slice(prices: ArrayView1<f64>) -> GarchResult<Array1<f64>> {
    if prices.len() < 2 {
        return Err(GarchError::InsufficientData {
            needed: 2,
            found: prices.len(),
            context: "log returns",
        });
    }
    if let Some(index) = prices.iter().position(|p| !p.is_finite() || *p <= 0.0) {
        return Err(GarchError::InvalidPrice { index, value: prices[index] });
    }
    Ok(prices.windows(2).into_iter().map(|w| (w[1] / w[0]).ln()).collect())
}

/// Population variance about the sample mean; 0 for fewer than one point.
pub fn sample_variance(values: ArrayView1<f64>) -> f64 {
    match values.mean() {
        Some(mean) => {
            values.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / values.len() as f64
        }
        None => 0.0,
    }
}

/// First non-finite entry as `NonFiniteData`.
pub fn check_finite(values: ArrayView1<f64>) -> GarchResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(GarchError::NonFiniteData { index, value: values[index] }),
        None => Ok(()),
    }
}

// ---- Helper methods ----

fn check_lengths(dates: usize, values: usize) -> GarchResult<()> {
    if dates != values {
        return Err(GarchError::InvalidParameters {
            reason: format!("{dates} dates but {values} values"),
        });
    }
    Ok(())
}

fn check_dates(dates: &[NaiveDate]) -> GarchResult<()> {
    match dates.windows(2).position(|w| w[1] <= w[0]) {
        Some(i) => Err(GarchError::UnorderedDates { index: i + 1 }),
        None => Ok(()),
    }
}
