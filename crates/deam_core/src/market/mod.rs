//! Market data: yield curves and discounting.

mod error;
mod flat;
mod zero_curve;

pub use error::MarketDataError;
pub use flat::FlatCurve;
pub use zero_curve::ZeroCurve;

/// Continuously compounded yield curve.
///
/// # Contract
///
/// - `yield_at(t)` returns the zero rate for maturity `t` in years
/// - `discount_factor(t)` returns `exp(-yield_at(t) * t)`
///
/// Implementations are read-only after construction; they can be
/// shared freely across threads.
pub trait YieldCurve {
    /// Continuously compounded zero yield for maturity `t` (years).
    fn yield_at(&self, t: f64) -> f64;

    /// Discount factor `exp(-r(t) * t)`.
    fn discount_factor(&self, t: f64) -> f64 {
        (-self.yield_at(t) * t).exp()
    }
}
