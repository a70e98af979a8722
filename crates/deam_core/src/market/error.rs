//! Market data error types.

use crate::types::InterpolationError;
use thiserror::Error;

/// Yield-curve construction and query errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// No points supplied for curve construction.
    #[error("Empty curve: no maturity/yield points supplied")]
    EmptyCurve,

    /// Invalid maturity (negative time).
    #[error("Invalid maturity: t = {t}")]
    InvalidMaturity {
        /// The invalid maturity value
        t: f64,
    },

    /// Interpolation error during curve construction.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),
}
