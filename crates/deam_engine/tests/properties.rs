//! Property tests backing the solver preconditions.

use deam_core::types::{OptionRight, Quote};
use deam_engine::implied_vol::{implied_vol, ImpliedVolConfig};
use deam_engine::oracle::{ModelOracle, PricingOracle, VanillaSpec};
use proptest::prelude::*;

proptest! {
    /// The bisection fallback assumes the European price is
    /// non-decreasing in volatility over the whole search range.
    #[test]
    fn european_price_monotone_in_vol(
        spot in 10.0f64..500.0,
        moneyness in 0.5f64..2.0,
        ttm in 0.05f64..3.0,
        rate in -0.01f64..0.10,
        dividend in 0.0f64..0.08,
        vol_lo in 1e-9f64..6.0,
        bump in 0.0f64..6.0,
        is_call in any::<bool>(),
    ) {
        let spec = VanillaSpec {
            spot,
            strike: spot * moneyness,
            ttm,
            rate,
            dividend,
            right: if is_call { OptionRight::Call } else { OptionRight::Put },
        };
        let oracle = ModelOracle;
        let lo = oracle.european_price(&spec, vol_lo).unwrap();
        let hi = oracle.european_price(&spec, vol_lo + bump).unwrap();
        prop_assert!(hi >= lo - 1e-9, "price fell from {lo} to {hi}");
    }

    /// Whenever the primary solve succeeds, it recovers the generating
    /// volatility of a synthetic quote.
    #[test]
    fn implied_vol_inverts_analytic_price(
        spot in 50.0f64..200.0,
        moneyness in 0.9f64..1.1,
        ttm in 0.25f64..2.0,
        vol in 0.1f64..1.0,
    ) {
        let spec = VanillaSpec {
            spot,
            strike: spot * moneyness,
            ttm,
            rate: 0.03,
            dividend: 0.0,
            right: OptionRight::Put,
        };
        let oracle = ModelOracle;
        let mid = oracle.european_price(&spec, vol).unwrap();
        prop_assume!(mid > 0.05);

        let quote = Quote::new(spot, spec.strike, ttm, 0.03, 0.0, OptionRight::Put, mid);
        let recovered = implied_vol(&oracle, &quote, &ImpliedVolConfig::raw()).unwrap();
        prop_assert!((recovered - vol).abs() < 1e-3, "vol {vol} recovered as {recovered}");
    }
}
