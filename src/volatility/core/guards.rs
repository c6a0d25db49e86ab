//! Clamping bounds for conditional variances.
use crate::volatility::errors::{GarchError, GarchResult};

/// Lower/upper clamp applied to every σ² produced by the in-sample recursion
/// and by the forecaster.
///
/// The bounds live in the units of the series being filtered; use
/// [`VarianceGuards::rescaled`] when moving between scaled and original
/// return units. A clamped σ² contributes a zero sensitivity row to the
/// analytic gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarianceGuards {
    pub min: f64,
    pub max: f64,
}

impl VarianceGuards {
    /// # Errors
    /// - `InvalidVarianceGuards` unless both bounds are finite and `0 < min < max`.
    pub fn new(value: (f64, f64)) -> GarchResult<Self> {
        let (min, max) = value;
        if !min.is_finite() || !max.is_finite() {
            return Err(GarchError::InvalidVarianceGuards {
                min,
                max,
                reason: "Variance guards must be finite.",
            });
        }
        if min <= 0.0 {
            return Err(GarchError::InvalidVarianceGuards {
                min,
                max,
                reason: "Variance guards must be strictly positive.",
            });
        }
        if min >= max {
            return Err(GarchError::InvalidVarianceGuards {
                min,
                max,
                reason: "Variance guards must have min < max.",
            });
        }
        Ok(VarianceGuards { min, max })
    }

    /// Same guards for a series multiplied by `1 / factor`, i.e. both bounds
    /// divided by `factor²`.
    pub fn rescaled(&self, factor: f64) -> Self {
        let f2 = factor * factor;
        VarianceGuards { min: self.min / f2, max: self.max / f2 }
    }

    /// `value` clamped into `[min, max]`, and whether clamping happened.
    /// NaN passes through untouched.
    pub fn clamp(&self, value: f64) -> (f64, bool) {
        if value < self.min {
            (self.min, true)
        } else if value > self.max {
            (self.max, true)
        } else {
            (value, false)
        }
    }
}

impl Default for VarianceGuards {
    fn default() -> Self {
        VarianceGuards { min: 1e-12, max: 1e12 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover constructor validation, clamping and rescaling.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Each invalid configuration is rejected with its own reason.
    //
    // Given
    // -----
    // - (1, 1), (0, 10) and (1, +inf).
    //
    // Expect
    // ------
    // - `InvalidVarianceGuards` for all three, with the bounds echoed back.
    fn new_rejects_invalid_bounds() {
        // Act
        let equal = VarianceGuards::new((1.0, 1.0));
        let zero = VarianceGuards::new((0.0, 10.0));
        let inf = VarianceGuards::new((1.0, f64::INFINITY));

        // Assert
        assert!(matches!(
            equal,
            Err(GarchError::InvalidVarianceGuards { min, max, .. }) if min == 1.0 && max == 1.0
        ));
        assert!(matches!(zero, Err(GarchError::InvalidVarianceGuards { .. })));
        assert!(matches!(inf, Err(GarchError::InvalidVarianceGuards { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Clamping reports whether it changed the value; rescaling divides by f².
    //
    // Given
    // -----
    // - Guards (1e-4, 1e4) and a scale factor of 100.
    //
    // Expect
    // ------
    // - Values outside are clamped and flagged, inside untouched; rescaled
    //   guards are (1e-8, 1).
    fn clamp_flags_and_rescale_divides_by_square() {
        // Arrange
        let guards = VarianceGuards::new((1e-4, 1e4)).expect("valid guards");

        // Act
        let low = guards.clamp(1e-9);
        let mid = guards.clamp(2.0);
        let high = guards.clamp(f64::INFINITY);
        let rescaled = guards.rescaled(100.0);

        // Assert
        assert_eq!(low, (1e-4, true));
        assert_eq!(mid, (2.0, false));
        assert_eq!(high, (1e4, true));
        assert!((rescaled.min - 1e-8).abs() < 1e-20);
        assert!((rescaled.max - 1.0).abs() < 1e-12);
    }
}
