//! Characteristic-function Heston pricer.
//!
//! European prices come from the two risk-neutral probabilities
//!
//! ```text
//! C = S e^{-qT} P₁ - K e^{-rT} P₂
//! Pⱼ = 1/2 + (1/π) ∫₀^∞ Re[ e^{-iu ln K} φ(u - i·1{j=1}) / (iu) ] du
//! ```
//!
//! with the characteristic function in the Gatheral (2006)
//! formulation, which avoids the branch-cut discontinuities of the
//! original Heston paper. The integral is evaluated by the midpoint
//! rule on a truncated grid, which sidesteps the removable singularity
//! at u = 0; puts come from put-call parity.

use super::HestonParams;
use crate::ValuationError;
use deam_core::types::OptionRight;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Integration grid size.
const N_POINTS: usize = 256;
/// Truncation of the Fourier integral.
const U_MAX: f64 = 100.0;

/// Price a European option under Heston dynamics.
///
/// # Errors
///
/// - `ValuationError::InvalidInput` for non-positive S/K/T or
///   parameters outside their admissible ranges
/// - `ValuationError::NonFinite` if the integration produces a
///   non-finite price
///
/// # Example
///
/// ```
/// use deam_core::types::OptionRight;
/// use deam_models::heston::{european_price, HestonParams};
///
/// let p = european_price(
///     100.0, 100.0, 1.0, 0.03, 0.0,
///     &HestonParams::default(), OptionRight::Call,
/// ).unwrap();
/// assert!(p > 0.0 && p < 100.0);
/// ```
pub fn european_price(
    spot: f64,
    strike: f64,
    ttm: f64,
    rate: f64,
    dividend: f64,
    params: &HestonParams,
    right: OptionRight,
) -> Result<f64, ValuationError> {
    if spot <= 0.0 || strike <= 0.0 || ttm <= 0.0 {
        return Err(ValuationError::invalid_input(format!(
            "heston inputs must be positive: S = {spot}, K = {strike}, T = {ttm}"
        )));
    }
    if !(spot.is_finite() && strike.is_finite() && ttm.is_finite() && rate.is_finite()) {
        return Err(ValuationError::invalid_input(
            "heston inputs must be finite".to_string(),
        ));
    }
    if params.v0 < 0.0 || params.kappa <= 0.0 || params.theta < 0.0 || params.sigma <= 0.0 {
        return Err(ValuationError::invalid_input(format!(
            "inadmissible heston parameters: {params:?}"
        )));
    }
    if params.rho <= -1.0 || params.rho >= 1.0 {
        return Err(ValuationError::invalid_input(format!(
            "heston rho must be in (-1, 1): rho = {}",
            params.rho
        )));
    }

    let forward = spot * ((rate - dividend) * ttm).exp();
    let df_r = (-rate * ttm).exp();

    let du = U_MAX / N_POINTS as f64;
    let ln_k = strike.ln();
    let i = Complex64::new(0.0, 1.0);

    let mut sum1 = 0.0;
    let mut sum2 = 0.0;

    // Midpoint rule over (0, U_MAX); u = 0 is a removable singularity
    // the grid never touches.
    for k in 0..N_POINTS {
        let u = (k as f64 + 0.5) * du;
        let exp_term = (-i * u * ln_k).exp();

        let phi1 = characteristic_fn(Complex64::new(u, -1.0), spot, ttm, rate, dividend, params);
        let phi2 = characteristic_fn(Complex64::new(u, 0.0), spot, ttm, rate, dividend, params);

        sum1 += (exp_term * phi1 / (i * u)).re;
        sum2 += (exp_term * phi2 / (i * u)).re;
    }

    // φ(-i) = F, so P1 integrand carries a 1/F normalisation.
    let p1 = (0.5 + du / PI * sum1 / forward).clamp(0.0, 1.0);
    let p2 = (0.5 + du / PI * sum2).clamp(0.0, 1.0);

    let call = df_r * (forward * p1 - strike * p2);
    let price = match right {
        OptionRight::Call => call.max(0.0),
        OptionRight::Put => (call - df_r * (forward - strike)).max(0.0),
    };

    if !price.is_finite() {
        return Err(ValuationError::non_finite("heston integration"));
    }
    Ok(price)
}

/// Gatheral-formulation characteristic function of ln S_T.
fn characteristic_fn(
    u: Complex64,
    spot: f64,
    ttm: f64,
    rate: f64,
    dividend: f64,
    params: &HestonParams,
) -> Complex64 {
    let i = Complex64::new(0.0, 1.0);
    let one = Complex64::new(1.0, 0.0);

    let sigma2 = params.sigma * params.sigma;
    let iu = i * u;
    let beta = Complex64::new(params.kappa, 0.0) - params.rho * params.sigma * iu;

    let mut d = (beta * beta + sigma2 * (u * u + iu)).sqrt();
    if d.re < 0.0 {
        d = -d;
    }

    let g = (beta - d) / (beta + d);
    let exp_neg_dt = (-d * ttm).exp();
    let log_term = ((one - g * exp_neg_dt) / (one - g)).ln();

    let a = params.kappa * params.theta / sigma2;
    let c = iu * (spot.ln() + (rate - dividend) * ttm) + a * ((beta - d) * ttm - 2.0 * log_term);
    let d_term = ((beta - d) / sigma2) * ((one - exp_neg_dt) / (one - g * exp_neg_dt));

    (c + d_term * params.v0).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic::european_price as bs_price;
    use approx::assert_relative_eq;

    fn base_params() -> HestonParams {
        HestonParams {
            v0: 0.04,
            kappa: 1.5,
            theta: 0.04,
            sigma: 0.3,
            rho: -0.7,
        }
    }

    #[test]
    fn degenerate_vol_of_vol_matches_black_scholes() {
        // With sigma ~ 0 and v0 = theta the variance is effectively
        // constant, so the price collapses to Black-Scholes at sqrt(v0).
        let params = HestonParams {
            v0: 0.04,
            kappa: 2.0,
            theta: 0.04,
            sigma: 0.011,
            rho: 0.0,
        };
        let heston =
            european_price(100.0, 100.0, 1.0, 0.03, 0.01, &params, OptionRight::Call).unwrap();
        let bs = bs_price(100.0, 100.0, 1.0, 0.03, 0.01, 0.2, OptionRight::Call).unwrap();
        assert_relative_eq!(heston, bs, max_relative = 2e-2);
    }

    #[test]
    fn put_call_parity_holds() {
        let params = base_params();
        let call =
            european_price(100.0, 95.0, 0.75, 0.03, 0.02, &params, OptionRight::Call).unwrap();
        let put = european_price(100.0, 95.0, 0.75, 0.03, 0.02, &params, OptionRight::Put).unwrap();
        let lhs = call - put;
        let rhs = 100.0 * (-0.02f64 * 0.75).exp() - 95.0 * (-0.03f64 * 0.75).exp();
        assert_relative_eq!(lhs, rhs, epsilon = 1e-6);
    }

    #[test]
    fn price_respects_static_bounds() {
        let params = base_params();
        let df_q = (-0.01f64 * 2.0).exp();
        let df_r = (-0.03f64 * 2.0).exp();
        let call = european_price(100.0, 110.0, 2.0, 0.03, 0.01, &params, OptionRight::Call).unwrap();
        assert!(call >= (100.0 * df_q - 110.0 * df_r).max(0.0));
        assert!(call <= 100.0 * df_q);
        let put = european_price(100.0, 110.0, 2.0, 0.03, 0.01, &params, OptionRight::Put).unwrap();
        assert!(put >= (110.0 * df_r - 100.0 * df_q).max(0.0));
        assert!(put <= 110.0 * df_r);
    }

    #[test]
    fn rejects_bad_inputs() {
        let params = base_params();
        assert!(european_price(-1.0, 100.0, 1.0, 0.0, 0.0, &params, OptionRight::Call).is_err());
        assert!(european_price(100.0, 100.0, 0.0, 0.0, 0.0, &params, OptionRight::Call).is_err());

        let bad_rho = HestonParams {
            rho: 1.0,
            ..base_params()
        };
        assert!(european_price(100.0, 100.0, 1.0, 0.0, 0.0, &bad_rho, OptionRight::Call).is_err());

        let bad_sigma = HestonParams {
            sigma: 0.0,
            ..base_params()
        };
        assert!(
            european_price(100.0, 100.0, 1.0, 0.0, 0.0, &bad_sigma, OptionRight::Call).is_err()
        );
    }

    #[test]
    fn itm_call_carries_its_intrinsic_value() {
        let params = base_params();
        let price =
            european_price(100.0, 80.0, 1.0, 0.03, 0.0, &params, OptionRight::Call).unwrap();
        let intrinsic_pv = 100.0 - 80.0 * (-0.03f64).exp();
        assert!(price >= intrinsic_pv);
        assert!(price <= 100.0);
    }
}
