//! Interpolation over scattered 1-D data.

mod monotone_cubic;

pub use monotone_cubic::MonotoneCubicInterpolator;
