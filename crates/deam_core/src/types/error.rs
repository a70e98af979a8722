//! Error types for the numerical primitives.
//!
//! This module provides:
//! - `SolverError`: Errors from root-finding and least-squares solvers
//! - `InterpolationError`: Errors from interpolation operations

use thiserror::Error;

/// Root-finding and optimisation solver errors.
///
/// # Variants
/// - `NoBracket`: Objective has the same sign at both bracket endpoints
/// - `MaxIterationsExceeded`: Solver failed to converge within the limit
/// - `NumericalInstability`: NaN/Inf or a degenerate system mid-solve
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// No sign change between the bracket endpoints.
    #[error("No root bracket: f({a}) and f({b}) have the same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// Iteration limit reached before convergence.
    #[error("Solver did not converge within {iterations} iterations")]
    MaxIterationsExceeded {
        /// Iteration limit that was exhausted
        iterations: usize,
    },

    /// Numerical instability during the solve.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

/// Interpolation errors.
///
/// # Variants
/// - `OutOfBounds`: Query point outside the knot range
/// - `InsufficientData`: Too few points to build the interpolant
/// - `InvalidInput`: Mismatched or malformed input arrays
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpolationError {
    /// Query point outside the valid interpolation domain.
    #[error("Query point {x} outside valid domain [{min}, {max}]")]
    OutOfBounds {
        /// The query point that was out of bounds
        x: f64,
        /// Minimum valid value
        min: f64,
        /// Maximum valid value
        max: f64,
    },

    /// Insufficient data points for interpolation.
    #[error("Insufficient data points: got {got}, need at least {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Invalid input data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
