//! Option market quote types.

use serde::{Deserialize, Serialize};

/// Option exercise right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionRight {
    /// Right to buy the underlying at the strike.
    Call,
    /// Right to sell the underlying at the strike.
    Put,
}

impl OptionRight {
    /// Intrinsic payoff for a given underlying level.
    #[inline]
    pub fn payoff(self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionRight::Call => (spot - strike).max(0.0),
            OptionRight::Put => (strike - spot).max(0.0),
        }
    }

    /// True if this is a call.
    #[inline]
    pub fn is_call(self) -> bool {
        matches!(self, OptionRight::Call)
    }
}

/// One observed American-style option quote.
///
/// Quotes are immutable inputs: every downstream component reads them
/// and never mutates them. The only defensive adjustment is the
/// dividend-yield percent correction applied by [`Quote::dividend_yield`].
///
/// # Invariants
///
/// `spot > 0`, `strike > 0`, `ttm > 0`; `mid` must be finite and
/// positive for the quote to be usable ([`Quote::is_valid`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Spot price of the underlying (S).
    pub spot: f64,
    /// Strike price (K).
    pub strike: f64,
    /// Time to maturity in years (T).
    pub ttm: f64,
    /// Continuously compounded risk-free rate (r).
    pub rate: f64,
    /// Continuously compounded dividend yield (q), decimal.
    pub dividend: f64,
    /// Call or put.
    pub right: OptionRight,
    /// Observed mid price (P).
    pub mid: f64,
}

impl Quote {
    /// Create a new quote.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        spot: f64,
        strike: f64,
        ttm: f64,
        rate: f64,
        dividend: f64,
        right: OptionRight,
        mid: f64,
    ) -> Self {
        Self {
            spot,
            strike,
            ttm,
            rate,
            dividend,
            right,
            mid,
        }
    }

    /// Dividend yield with the percent-mistake correction applied.
    ///
    /// A yield above 1.0 is taken to be a value quoted in percent by
    /// mistake and is divided by 100. All downstream pricing uses this
    /// accessor rather than the raw field.
    #[inline]
    pub fn dividend_yield(&self) -> f64 {
        if self.dividend > 1.0 {
            self.dividend / 100.0
        } else {
            self.dividend
        }
    }

    /// Basic positivity/finiteness check on S, K, T and the mid price.
    pub fn is_valid(&self) -> bool {
        self.spot > 0.0
            && self.strike > 0.0
            && self.ttm > 0.0
            && self.mid.is_finite()
            && self.mid > 0.0
            && self.spot.is_finite()
            && self.strike.is_finite()
            && self.ttm.is_finite()
            && self.rate.is_finite()
            && self.dividend.is_finite()
    }
}
