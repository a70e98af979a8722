//! Binomial lattice pricing for American and European exercise.

mod binomial;
mod family;

pub use binomial::{american_price, european_lattice_price};
pub use family::TreeFamily;
