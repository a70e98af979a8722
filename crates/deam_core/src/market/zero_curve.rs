//! Zero-yield curve built from maturity/yield observations.

use super::{MarketDataError, YieldCurve};
use crate::math::interpolators::MonotoneCubicInterpolator;

/// Zero curve over observed (maturity, yield) points.
///
/// Construction sorts the points by maturity and de-duplicates by
/// keeping the last value seen at a given maturity. Inside the
/// observed range queries go through a monotone cubic interpolant;
/// outside it the curve extrapolates linearly with the slope of the
/// two nearest boundary points. A single-point curve is constant.
///
/// # Example
///
/// ```
/// use deam_core::market::{YieldCurve, ZeroCurve};
///
/// let curve = ZeroCurve::from_points(&[(1.0, 0.03), (2.0, 0.035)]).unwrap();
/// // Below-range query extrapolates with the first segment's slope.
/// assert!((curve.yield_at(0.5) - 0.0275).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct ZeroCurve {
    /// Sorted, de-duplicated maturities.
    maturities: Vec<f64>,
    /// Yields per maturity.
    yields: Vec<f64>,
    /// Interpolant over the observed range; `None` for a 1-point curve.
    interp: Option<MonotoneCubicInterpolator>,
}

impl ZeroCurve {
    /// Build a curve from (maturity-in-years, decimal-yield) points.
    ///
    /// # Errors
    ///
    /// `MarketDataError::EmptyCurve` if `points` is empty.
    pub fn from_points(points: &[(f64, f64)]) -> Result<Self, MarketDataError> {
        if points.is_empty() {
            return Err(MarketDataError::EmptyCurve);
        }

        let mut sorted: Vec<(f64, f64)> = points.to_vec();
        sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        // Last value wins at a duplicated maturity.
        let mut maturities: Vec<f64> = Vec::with_capacity(sorted.len());
        let mut yields: Vec<f64> = Vec::with_capacity(sorted.len());
        for (t, y) in sorted {
            if maturities.last() == Some(&t) {
                *yields.last_mut().unwrap() = y;
            } else {
                maturities.push(t);
                yields.push(y);
            }
        }

        let interp = if maturities.len() >= 2 {
            Some(MonotoneCubicInterpolator::new(&maturities, &yields)?)
        } else {
            None
        };

        Ok(Self {
            maturities,
            yields,
            interp,
        })
    }

    /// Number of distinct pillar points.
    pub fn len(&self) -> usize {
        self.maturities.len()
    }

    /// Always false; construction rejects empty point sets.
    pub fn is_empty(&self) -> bool {
        // Construction guarantees at least one point.
        false
    }

    /// Linear extension using the slope of the two nearest pillars.
    fn extrapolate(&self, t: f64) -> f64 {
        let n = self.maturities.len();
        let (x1, x2, y1, y2) = if t < self.maturities[0] {
            (
                self.maturities[0],
                self.maturities[1],
                self.yields[0],
                self.yields[1],
            )
        } else {
            (
                self.maturities[n - 2],
                self.maturities[n - 1],
                self.yields[n - 2],
                self.yields[n - 1],
            )
        };
        let slope = (y2 - y1) / (x2 - x1);
        y1 + slope * (t - x1)
    }
}

impl YieldCurve for ZeroCurve {
    fn yield_at(&self, t: f64) -> f64 {
        let Some(interp) = &self.interp else {
            return self.yields[0];
        };
        match interp.interpolate(t) {
            Ok(y) => y,
            Err(_) => self.extrapolate(t),
        }
    }
}
