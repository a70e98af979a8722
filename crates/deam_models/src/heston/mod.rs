//! Semi-analytical Heston European pricing.

mod params;
mod pricer;

pub use params::{HestonParams, HestonSeed};
pub use pricer::european_price;
