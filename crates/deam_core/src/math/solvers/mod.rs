//! Root-finding and least-squares solvers.
//!
//! Two solvers cover every numerical need of the workspace:
//!
//! - [`BrentSolver`]: bracketed scalar root finding without
//!   derivatives, used for volatility inversion. A guess-seeded entry
//!   point mirrors the `solve(f, tol, guess, lo, hi)` shape the
//!   de-Americanization engine calls with.
//! - [`LevenbergMarquardtSolver`]: damped nonlinear least squares for
//!   Heston calibration, with residual, parameter-change and
//!   stationary-state end criteria.
//!
//! ```
//! use deam_core::math::solvers::{BrentSolver, SolverConfig};
//!
//! let solver = BrentSolver::new(SolverConfig::new(1e-10, 100));
//! let root = solver.find_root(|x: f64| x * x * x - x - 2.0, 1.0, 2.0).unwrap();
//! assert!((root * root * root - root - 2.0).abs() < 1e-9);
//! ```

mod brent;
mod config;
mod levenberg_marquardt;

pub use brent::BrentSolver;
pub use config::SolverConfig;
pub use levenberg_marquardt::{LMConfig, LMResult, LevenbergMarquardtSolver};
