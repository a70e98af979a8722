//! Core data types: quotes, errors, and date helpers.

mod error;
mod quote;
mod time;

pub use error::{InterpolationError, SolverError};
pub use quote::{OptionRight, Quote};
pub use time::{maturity_date, tenor_days, year_fraction};
