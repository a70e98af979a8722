//! Monotone cubic Hermite interpolation.

use crate::types::InterpolationError;

/// Monotone cubic Hermite interpolator (Fritsch-Carlson tangents).
///
/// Produces a C¹ piecewise cubic through the data that never
/// overshoots: wherever the data is monotone, the interpolant is
/// monotone too. This is the property yield-curve construction relies
/// on, where a spline oscillating between pillars would manufacture
/// arbitrage.
///
/// Extrapolation is deliberately not supported; queries outside the
/// knot range return `InterpolationError::OutOfBounds` and the caller
/// decides how to extend the curve.
///
/// # Example
///
/// ```
/// use deam_core::math::interpolators::MonotoneCubicInterpolator;
///
/// let interp = MonotoneCubicInterpolator::new(
///     &[1.0, 2.0, 5.0],
///     &[0.03, 0.035, 0.04],
/// ).unwrap();
/// let y = interp.interpolate(3.0).unwrap();
/// assert!(y > 0.035 && y < 0.04);
/// ```
#[derive(Debug, Clone)]
pub struct MonotoneCubicInterpolator {
    /// Sorted knot x-coordinates.
    xs: Vec<f64>,
    /// Knot values.
    ys: Vec<f64>,
    /// Endpoint tangents per knot.
    tangents: Vec<f64>,
}

impl MonotoneCubicInterpolator {
    /// Build the interpolant from knots, sorting by x.
    ///
    /// # Errors
    ///
    /// - `InterpolationError::InvalidInput` on mismatched lengths,
    ///   non-finite data or duplicate x values
    /// - `InterpolationError::InsufficientData` for fewer than 2 points
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, InterpolationError> {
        if xs.len() != ys.len() {
            return Err(InterpolationError::InvalidInput(format!(
                "xs and ys must have same length: got {} and {}",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(InterpolationError::InsufficientData {
                got: xs.len(),
                need: 2,
            });
        }
        if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
            return Err(InterpolationError::InvalidInput(
                "non-finite knot data".to_string(),
            ));
        }

        let mut pairs: Vec<(f64, f64)> = xs.iter().copied().zip(ys.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();

        if xs.windows(2).any(|w| w[0] == w[1]) {
            return Err(InterpolationError::InvalidInput(
                "duplicate x values".to_string(),
            ));
        }

        let tangents = Self::fritsch_carlson_tangents(&xs, &ys);
        Ok(Self { xs, ys, tangents })
    }

    /// Secant slopes limited so each segment stays monotone.
    fn fritsch_carlson_tangents(xs: &[f64], ys: &[f64]) -> Vec<f64> {
        let n = xs.len();
        let slopes: Vec<f64> = (0..n - 1)
            .map(|i| (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]))
            .collect();

        let mut m = vec![0.0; n];
        m[0] = slopes[0];
        m[n - 1] = slopes[n - 2];
        for i in 1..n - 1 {
            // Zero tangent at local extrema, otherwise the harmonic
            // mean of the neighbouring secants (Fritsch-Butland).
            if slopes[i - 1] * slopes[i] <= 0.0 {
                m[i] = 0.0;
            } else {
                let w1 = 2.0 * (xs[i + 1] - xs[i]) + (xs[i] - xs[i - 1]);
                let w2 = (xs[i + 1] - xs[i]) + 2.0 * (xs[i] - xs[i - 1]);
                m[i] = (w1 + w2) / (w1 / slopes[i - 1] + w2 / slopes[i]);
            }
        }

        // Clamp endpoint tangents so the first and last segments
        // cannot overshoot.
        for (i, s) in [(0usize, slopes[0]), (n - 1, slopes[n - 2])] {
            if s == 0.0 {
                m[i] = 0.0;
            } else if m[i] / s > 3.0 {
                m[i] = 3.0 * s;
            }
        }

        m
    }

    /// Evaluate the interpolant at `x`.
    ///
    /// # Errors
    ///
    /// `InterpolationError::OutOfBounds` if `x` lies outside the knots.
    pub fn interpolate(&self, x: f64) -> Result<f64, InterpolationError> {
        let (min, max) = (self.xs[0], *self.xs.last().unwrap());
        if x < min || x > max {
            return Err(InterpolationError::OutOfBounds { x, min, max });
        }

        let i = match self.xs.binary_search_by(|k| k.partial_cmp(&x).unwrap()) {
            Ok(i) => return Ok(self.ys[i]),
            Err(i) => i - 1,
        };

        let h = self.xs[i + 1] - self.xs[i];
        let t = (x - self.xs[i]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        // Cubic Hermite basis
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        Ok(h00 * self.ys[i]
            + h10 * h * self.tangents[i]
            + h01 * self.ys[i + 1]
            + h11 * h * self.tangents[i + 1])
    }

    /// Smallest knot.
    pub fn x_min(&self) -> f64 {
        self.xs[0]
    }

    /// Largest knot.
    pub fn x_max(&self) -> f64 {
        *self.xs.last().unwrap()
    }
}
