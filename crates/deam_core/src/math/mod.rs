//! Numerical primitives: root finding, least squares, interpolation.

pub mod interpolators;
pub mod solvers;
