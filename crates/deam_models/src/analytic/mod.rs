//! Analytic European option pricing.

mod black_scholes;
mod distributions;

pub use black_scholes::european_price;
pub use distributions::{norm_cdf, norm_pdf};
