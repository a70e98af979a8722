//! Flat yield curve.

use super::YieldCurve;

/// Constant continuously compounded yield at every maturity.
///
/// The per-quote risk-free and dividend term structures are flat
/// curves built from the quote's `r` and `q`.
///
/// # Example
///
/// ```
/// use deam_core::market::{FlatCurve, YieldCurve};
///
/// let curve = FlatCurve::new(0.05);
/// assert!((curve.discount_factor(1.0) - (-0.05f64).exp()).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatCurve {
    rate: f64,
}

impl FlatCurve {
    /// Create a flat curve at the given rate.
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    /// The constant rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl YieldCurve for FlatCurve {
    fn yield_at(&self, _t: f64) -> f64 {
        self.rate
    }
}
