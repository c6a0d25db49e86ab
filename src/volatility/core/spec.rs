//! Model orders for GARCH(p, q).
use crate::volatility::errors::{GarchError, GarchResult};
use serde::Serialize;

/// Largest order accepted by default for either lag polynomial.
pub const MAX_ORDER: usize = 5;

/// GARCH(p, q) orders.
///
/// - `p`: number of ARCH lags, i.e. coefficients α on past ε².
/// - `q`: number of GARCH lags, i.e. coefficients β on past σ².
///
/// Both are at least 1; GARCH(1, 1) is the usual choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GarchSpec {
    pub p: usize,
    pub q: usize,
}

impl GarchSpec {
    /// Orders bounded by [`MAX_ORDER`].
    pub fn new(p: usize, q: usize) -> GarchResult<Self> {
        Self::with_max_order(p, q, MAX_ORDER)
    }

    /// Orders bounded by a caller-supplied limit.
    ///
    /// # Errors
    /// - `InvalidParameters` when `p` or `q` is outside `[1, max_order]`.
    pub fn with_max_order(p: usize, q: usize, max_order: usize) -> GarchResult<Self> {
        for (name, value) in [("p", p), ("q", q)] {
            if value == 0 || value > max_order {
                return Err(GarchError::InvalidParameters {
                    reason: format!("{name} must be between 1 and {max_order}; got: {value}"),
                });
            }
        }
        Ok(GarchSpec { p, q })
    }

    /// Smallest sample `fit` accepts: strictly more than `p + q + 10` returns.
    pub fn min_observations(&self) -> usize {
        self.p + self.q + 11
    }
}

impl std::fmt::Display for GarchSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GARCH({},{})", self.p, self.q)
    }
}
