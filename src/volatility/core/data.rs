//! Estimation input handed to the optimizer.
use crate::volatility::{
    core::returns::{check_finite, sample_variance},
    errors::{GarchError, GarchResult},
};
use ndarray::{Array1, ArrayView1};

/// Scaled returns plus the statistics the recursion is seeded with.
///
/// - `returns`: observations multiplied by `scale`.
/// - `mean`: sample mean of `returns`.
/// - `backcast`: sample variance of `returns` about `mean`; fills every
///   pre-sample ε² and σ² slot. It does not depend on θ.
#[derive(Debug, Clone, PartialEq)]
pub struct GarchData {
    pub returns: Array1<f64>,
    pub mean: f64,
    pub backcast: f64,
    pub scale: f64,
}

impl GarchData {
    /// # Errors
    /// - `InsufficientData` for an empty input.
    /// - `NonFiniteData` for the first NaN/±inf value.
    pub fn new(values: ArrayView1<f64>, scale: f64) -> GarchResult<Self> {
        if values.is_empty() {
            return Err(GarchError::InsufficientData { needed: 1, found: 0, context: "estimation" });
        }
        check_finite(values)?;
        let returns = values.mapv(|r| r * scale);
        let mean = returns.mean().unwrap_or(0.0);
        let backcast = sample_variance(returns.view());
        Ok(GarchData { returns, mean, backcast, scale })
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Scaling multiplies the mean by `s` and the backcast by `s²`.
    //
    // Given
    // -----
    // - Returns (0.01, -0.02, 0.03) and scale 100.
    //
    // Expect
    // ------
    // - mean 0.6667, backcast = 1e4 × unscaled variance; empty input rejected.
    fn scaling_is_applied_before_statistics() {
        // Arrange
        let raw = array![0.01, -0.02, 0.03];

        // Act
        let data = GarchData::new(raw.view(), 100.0).expect("finite returns");
        let empty = GarchData::new(Array1::<f64>::zeros(0).view(), 1.0);

        // Assert
        assert!((data.mean - 2.0 / 3.0).abs() < 1e-12);
        assert!((data.backcast - 1e4 * sample_variance(raw.view())).abs() < 1e-9);
        assert_eq!(data.len(), 3);
        assert!(matches!(empty, Err(GarchError::InsufficientData { .. })));
    }
}
