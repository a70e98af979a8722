//! Static no-arbitrage bounds on American option quotes.

use crate::EngineError;
use deam_core::types::{OptionRight, Quote};

/// Absolute slack applied to both bound edges.
const EPSILON: f64 = 1e-8;

/// Reject a quote whose mid price violates the static bounds.
///
/// With `df_r = e^{-rT}` and `df_q = e^{-qT}`, a call must lie in
/// `[max(0, S·df_q − K·df_r), S·df_q]` and a put in
/// `[max(0, K·df_r − S·df_q), K·df_r]`, each widened by an absolute
/// `1e-8` slack for quote rounding.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] if the quote fails the basic
///   positivity/finiteness check
/// - [`EngineError::NoArbitrageViolation`] if the mid price lies
///   outside the bounds
pub fn check(quote: &Quote) -> Result<(), EngineError> {
    if !quote.is_valid() {
        return Err(EngineError::InvalidInput(format!(
            "quote must have S > 0, K > 0, T > 0 and a finite positive mid: {quote:?}"
        )));
    }

    let df_r = (-quote.rate * quote.ttm).exp();
    let df_q = (-quote.dividend_yield() * quote.ttm).exp();
    let fwd_spot = quote.spot * df_q;
    let fwd_strike = quote.strike * df_r;

    let (lower, upper, right) = match quote.right {
        OptionRight::Call => ((fwd_spot - fwd_strike).max(0.0), fwd_spot, "call"),
        OptionRight::Put => ((fwd_strike - fwd_spot).max(0.0), fwd_strike, "put"),
    };

    if quote.mid < lower - EPSILON || quote.mid > upper + EPSILON {
        return Err(EngineError::NoArbitrageViolation {
            mid: quote.mid,
            lower,
            upper,
            right,
        });
    }
    Ok(())
}
