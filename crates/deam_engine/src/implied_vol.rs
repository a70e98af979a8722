//! Black-Scholes implied volatility extraction.
//!
//! Two-stage solve: a bounded Brent search against the analytic
//! European price, then a bisection fallback that only relies on the
//! price being non-decreasing in volatility.

use crate::deamericanize::{deamericanize, DeamConfig};
use crate::oracle::{PricingOracle, VanillaSpec};
use crate::EngineError;
use deam_core::math::solvers::{BrentSolver, SolverConfig};
use deam_core::types::Quote;
use tracing::debug;

/// Configuration of the implied-volatility solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpliedVolConfig {
    /// Tolerance of the primary bounded solve.
    pub tolerance: f64,
    /// Iteration cap of the primary bounded solve.
    pub max_iterations: usize,
    /// Lower edge of the volatility search range.
    pub min_vol: f64,
    /// Upper edge of the volatility search range.
    pub max_vol: f64,
    /// Iteration cap of the bisection fallback.
    pub bisection_iterations: usize,
    /// Absolute price tolerance of the bisection fallback.
    pub bisection_tolerance: f64,
    /// De-Americanize the mid price first; `None` solves against the
    /// raw mid.
    pub deam: Option<DeamConfig>,
}

impl Default for ImpliedVolConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 2000,
            min_vol: 1e-9,
            max_vol: 12.0,
            bisection_iterations: 120,
            bisection_tolerance: 1e-8,
            deam: Some(DeamConfig::default()),
        }
    }
}

impl ImpliedVolConfig {
    /// Configuration solving directly against the raw mid price.
    pub fn raw() -> Self {
        Self {
            deam: None,
            ..Self::default()
        }
    }
}

/// Extract the Black-Scholes implied volatility of a quote.
///
/// When the configuration carries a [`DeamConfig`], the mid price is
/// de-Americanized first and the solve targets the European-equivalent
/// price; otherwise it targets the raw mid.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] for unusable quote fields
/// - any de-Americanization failure, passed through unchanged
/// - [`EngineError::NumericalFailure`] if a non-finite price shows up
///   during the bisection fallback
/// - [`EngineError::NoConvergence`] if the fallback exhausts its
///   iteration budget
pub fn implied_vol(
    oracle: &dyn PricingOracle,
    quote: &Quote,
    config: &ImpliedVolConfig,
) -> Result<f64, EngineError> {
    if !quote.is_valid() {
        return Err(EngineError::InvalidInput(format!(
            "quote must have S > 0, K > 0, T > 0 and a finite positive mid: {quote:?}"
        )));
    }

    let target = match &config.deam {
        Some(deam_config) => {
            let price = deamericanize(oracle, quote, deam_config)?;
            if !price.is_finite() || price <= 0.0 {
                return Err(EngineError::NumericalFailure(format!(
                    "de-Americanized price {price} is not usable as a solve target"
                )));
            }
            price
        }
        None => quote.mid,
    };

    let spec = VanillaSpec::from_quote(quote);

    match primary_solve(oracle, &spec, target, config) {
        Ok(vol) if vol.is_finite() && vol > 0.0 => return Ok(vol),
        Ok(vol) => debug!(vol, "primary solve returned unusable volatility"),
        Err(err) => debug!(%err, "primary solve failed, falling back to bisection"),
    }

    bisection_fallback(oracle, &spec, target, config)
}

/// Bounded Brent solve against the analytic pricer.
fn primary_solve(
    oracle: &dyn PricingOracle,
    spec: &VanillaSpec,
    target: f64,
    config: &ImpliedVolConfig,
) -> Result<f64, EngineError> {
    let objective = |vol: f64| -> f64 {
        match oracle.european_price(spec, vol) {
            Ok(price) if price.is_finite() => price - target,
            _ => f64::NAN,
        }
    };
    let solver = BrentSolver::new(SolverConfig::new(config.tolerance, config.max_iterations));
    solver
        .find_root(objective, config.min_vol, config.max_vol)
        .map_err(|e| EngineError::RootSolveFailed(e.to_string()))
}

/// Bisection over volatility; relies on the price being non-decreasing
/// in volatility, which is not re-verified per call.
fn bisection_fallback(
    oracle: &dyn PricingOracle,
    spec: &VanillaSpec,
    target: f64,
    config: &ImpliedVolConfig,
) -> Result<f64, EngineError> {
    let mut lo = config.min_vol;
    let mut hi = config.max_vol;

    for _ in 0..config.bisection_iterations {
        let mid = 0.5 * (lo + hi);
        let price = oracle
            .european_price(spec, mid)
            .map_err(|e| EngineError::NumericalFailure(e.to_string()))?;
        if !price.is_finite() {
            return Err(EngineError::NumericalFailure(format!(
                "non-finite price at volatility {mid}"
            )));
        }

        let diff = price - target;
        if diff.abs() < config.bisection_tolerance {
            return Ok(mid);
        }
        if diff > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    Err(EngineError::NoConvergence {
        iterations: config.bisection_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::ModelOracle;
    use deam_core::types::OptionRight;
    use approx::assert_relative_eq;

    fn target_quote(vol: f64) -> Quote {
        let oracle = ModelOracle;
        let spec = VanillaSpec {
            spot: 100.0,
            strike: 105.0,
            ttm: 0.5,
            rate: 0.03,
            dividend: 0.0,
            right: OptionRight::Put,
        };
        let mid = oracle.european_price(&spec, vol).unwrap();
        Quote::new(100.0, 105.0, 0.5, 0.03, 0.0, OptionRight::Put, mid)
    }

    #[test]
    fn test_recovers_generating_volatility_raw() {
        let oracle = ModelOracle;
        let quote = target_quote(0.22);
        let vol = implied_vol(&oracle, &quote, &ImpliedVolConfig::raw()).unwrap();
        assert_relative_eq!(vol, 0.22, epsilon = 1e-5);
    }

    #[test]
    fn test_bisection_agrees_with_primary() {
        let oracle = ModelOracle;
        let quote = target_quote(0.35);
        let spec = VanillaSpec::from_quote(&quote);
        let config = ImpliedVolConfig::raw();

        let primary = primary_solve(&oracle, &spec, quote.mid, &config).unwrap();
        let fallback = bisection_fallback(&oracle, &spec, quote.mid, &config).unwrap();
        assert_relative_eq!(primary, fallback, epsilon = 1e-4);
    }

    #[test]
    fn test_deamericanized_call_negligible_dividend() {
        // The shortcut returns the mid itself, so the IV is the plain
        // Black-Scholes implied vol of the mid.
        let oracle = ModelOracle;
        let spec = VanillaSpec {
            spot: 100.0,
            strike: 100.0,
            ttm: 1.0,
            rate: 0.03,
            dividend: 0.0,
            right: OptionRight::Call,
        };
        let mid = oracle.european_price(&spec, 0.2).unwrap();
        let quote = Quote::new(100.0, 100.0, 1.0, 0.03, 0.0, OptionRight::Call, mid);
        let vol = implied_vol(&oracle, &quote, &ImpliedVolConfig::default()).unwrap();
        assert_relative_eq!(vol, 0.2, epsilon = 1e-5);
    }

    #[test]
    fn test_invalid_quote_rejected() {
        let oracle = ModelOracle;
        let quote = Quote::new(100.0, 100.0, -1.0, 0.03, 0.0, OptionRight::Call, 10.0);
        assert!(matches!(
            implied_vol(&oracle, &quote, &ImpliedVolConfig::raw()),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unreachable_target_does_not_converge() {
        // Mid above the maximum achievable European put price at any
        // volatility in the search range.
        let oracle = ModelOracle;
        let spec = VanillaSpec {
            spot: 100.0,
            strike: 105.0,
            ttm: 0.5,
            rate: 0.03,
            dividend: 0.0,
            right: OptionRight::Put,
        };
        let max_price = 105.0 * (-0.03f64 * 0.5).exp();
        let config = ImpliedVolConfig::raw();
        let result = bisection_fallback(&oracle, &spec, max_price + 1.0, &config);
        assert!(matches!(result, Err(EngineError::NoConvergence { .. })));
    }
}
