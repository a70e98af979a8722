//! Engine error taxonomy.
//!
//! Every failure is scoped to one quote, one group or one curve build;
//! nothing here aborts a batch.

use deam_models::ValuationError;
use thiserror::Error;

/// Failure modes of the inversion and calibration engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Non-finite or non-positive quote inputs.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Market price outside the static American-option bounds.
    #[error(
        "no-arbitrage violation: mid {mid} outside [{lower}, {upper}] for {right}"
    )]
    NoArbitrageViolation {
        /// Observed mid price.
        mid: f64,
        /// Lower static bound.
        lower: f64,
        /// Upper static bound.
        upper: f64,
        /// "call" or "put".
        right: &'static str,
    },

    /// Bracket expansion exhausted without finding a sign change.
    #[error("no volatility bracket found in [{lo}, {hi}] after {expansions} expansions")]
    NoBracketFound {
        /// Final lower bracket edge.
        lo: f64,
        /// Final upper bracket edge.
        hi: f64,
        /// Expansions performed.
        expansions: usize,
    },

    /// The bracketed root solver failed inside a valid bracket.
    #[error("root solve failed: {0}")]
    RootSolveFailed(String),

    /// Every tree family in the catalogue failed for this quote.
    #[error("de-Americanization failed: all tree families exhausted")]
    DeAmericanizationFailed,

    /// A scalar evaluation returned a non-finite value.
    #[error("numerical failure: {0}")]
    NumericalFailure(String),

    /// The bisection fallback exhausted its iteration budget.
    #[error("implied vol bisection did not converge within {iterations} iterations")]
    NoConvergence {
        /// Iteration budget that was exhausted.
        iterations: usize,
    },

    /// Too few quotes in a group produced a usable implied vol.
    #[error("insufficient calibration data: {provided} valid helpers, {required} required")]
    InsufficientCalibrationData {
        /// Minimum helper count for a calibration.
        required: usize,
        /// Valid helpers actually available.
        provided: usize,
    },

    /// Oracle-level valuation failure surfaced outside a search loop.
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}
