//! Pricing oracle seam.
//!
//! The engine never computes a price itself; it asks an oracle. The
//! trait boundary keeps the search and calibration policy testable
//! against counting or failing stand-ins.

use deam_core::types::{OptionRight, Quote};
use deam_models::heston::HestonParams;
use deam_models::lattice::TreeFamily;
use deam_models::ValuationError;

/// Instrument terms handed to the oracle for one valuation.
///
/// All inputs are explicit; the oracle must behave as a pure function
/// of this struct and the model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VanillaSpec {
    /// Spot price of the underlying.
    pub spot: f64,
    /// Strike price.
    pub strike: f64,
    /// Time to maturity in years.
    pub ttm: f64,
    /// Continuously compounded risk-free rate.
    pub rate: f64,
    /// Continuously compounded dividend yield.
    pub dividend: f64,
    /// Call or put.
    pub right: OptionRight,
}

impl VanillaSpec {
    /// Build a spec from a quote, applying the dividend percent
    /// correction.
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            spot: quote.spot,
            strike: quote.strike,
            ttm: quote.ttm,
            rate: quote.rate,
            dividend: quote.dividend_yield(),
            right: quote.right,
        }
    }
}

/// Valuation capabilities consumed by the engine.
pub trait PricingOracle: Send + Sync {
    /// American price on a binomial lattice of the given family.
    fn american_price(
        &self,
        spec: &VanillaSpec,
        vol: f64,
        family: TreeFamily,
        steps: usize,
    ) -> Result<f64, ValuationError>;

    /// Analytic Black-Scholes-Merton European price.
    fn european_price(&self, spec: &VanillaSpec, vol: f64) -> Result<f64, ValuationError>;

    /// Semi-analytic European price under Heston dynamics.
    fn heston_price(
        &self,
        spec: &VanillaSpec,
        params: &HestonParams,
    ) -> Result<f64, ValuationError>;
}

/// Production oracle backed by the model crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelOracle;

impl PricingOracle for ModelOracle {
    fn american_price(
        &self,
        spec: &VanillaSpec,
        vol: f64,
        family: TreeFamily,
        steps: usize,
    ) -> Result<f64, ValuationError> {
        deam_models::lattice::american_price(
            spec.spot,
            spec.strike,
            spec.ttm,
            spec.rate,
            spec.dividend,
            vol,
            spec.right,
            family,
            steps,
        )
    }

    fn european_price(&self, spec: &VanillaSpec, vol: f64) -> Result<f64, ValuationError> {
        deam_models::analytic::european_price(
            spec.spot,
            spec.strike,
            spec.ttm,
            spec.rate,
            spec.dividend,
            vol,
            spec.right,
        )
    }

    fn heston_price(
        &self,
        spec: &VanillaSpec,
        params: &HestonParams,
    ) -> Result<f64, ValuationError> {
        deam_models::heston::european_price(
            spec.spot,
            spec.strike,
            spec.ttm,
            spec.rate,
            spec.dividend,
            params,
            spec.right,
        )
    }
}
