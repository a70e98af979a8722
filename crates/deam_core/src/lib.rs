//! # deam_core: Numerical Foundation for the De-Americanization Workspace
//!
//! Bottom layer of the three-crate workspace, providing:
//! - Quote and option-right types (`types::quote`)
//! - Actual/365 date helpers (`types::time`)
//! - Error types: `SolverError`, `InterpolationError` (`types::error`)
//! - Root finding: `BrentSolver` (`math::solvers`)
//! - Nonlinear least squares: `LevenbergMarquardtSolver` (`math::solvers`)
//! - Monotone cubic interpolation (`math::interpolators`)
//! - Yield curves: `FlatCurve`, `ZeroCurve` (`market`)
//!
//! This crate has no dependency on the other `deam_*` crates and keeps
//! its external surface minimal: `chrono`, `thiserror`, `serde`.
//!
//! ## Usage
//!
//! ```rust
//! use deam_core::math::solvers::{BrentSolver, SolverConfig};
//! use deam_core::market::{YieldCurve, ZeroCurve};
//!
//! let solver = BrentSolver::new(SolverConfig::new(1e-8, 100));
//! let root = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
//! assert!((root - std::f64::consts::SQRT_2).abs() < 1e-7);
//!
//! let curve = ZeroCurve::from_points(&[(1.0, 0.03), (2.0, 0.035)]).unwrap();
//! assert!((curve.yield_at(0.5) - 0.0275).abs() < 1e-12);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market;
pub mod math;
pub mod types;
