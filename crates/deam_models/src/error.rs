//! Oracle-level valuation errors.

use thiserror::Error;

/// Errors from a single pricing evaluation.
///
/// These are per-evaluation signals: a bracket search receiving
/// `InvalidProbability` at one σ moves the bracket rather than
/// aborting the whole attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    /// Invalid input to a pricing formula.
    #[error("Invalid pricing input: {0}")]
    InvalidInput(String),

    /// Risk-neutral probability left [0, 1] for this parameterisation.
    #[error("Risk-neutral probability {p} outside [0, 1]")]
    InvalidProbability {
        /// The offending probability
        p: f64,
    },

    /// The pricer produced a non-finite value.
    #[error("Non-finite price: {context}")]
    NonFinite {
        /// Where the non-finite value appeared
        context: String,
    },
}

impl ValuationError {
    /// Convenience constructor for invalid-input errors.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ValuationError::InvalidInput(message.into())
    }

    /// Convenience constructor for non-finite results.
    pub fn non_finite(context: impl Into<String>) -> Self {
        ValuationError::NonFinite {
            context: context.into(),
        }
    }
}
