//! Volatility inversion and calibration engine.
//!
//! Converts American-style option market prices into European-equivalent
//! prices and Black-Scholes implied volatilities, then calibrates a
//! Heston model per quote group:
//!
//! - [`noarb`] — static no-arbitrage bound check on raw quotes
//! - [`deamericanize`] — inverts an American market price into a
//!   tree-model volatility and returns the analytic European price at
//!   that volatility, with fallback across tree families
//! - [`implied_vol`] — two-stage Black-Scholes implied-volatility
//!   solver (bounded Brent, then bisection)
//! - [`calibration`] — per-group Heston fit over implied-vol helpers
//!   and model repricing of every group member
//!
//! Pricing formulas are consumed through the [`oracle::PricingOracle`]
//! trait; [`oracle::ModelOracle`] is the production implementation.
//! Everything here is pure computation over explicit inputs: the
//! evaluation date is a parameter, never ambient state, so quotes and
//! groups can be processed concurrently.

#![deny(missing_docs)]

pub mod calibration;
pub mod deamericanize;
mod error;
pub mod implied_vol;
pub mod noarb;
pub mod oracle;

pub use error::EngineError;
