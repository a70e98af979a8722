//! Black-Scholes-Merton European pricing with continuous dividend yield.
//!
//! ## Formulas
//!
//! **Call**: C = S·e^(-qT)·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put**:  P = K·e^(-rT)·N(-d₂) - S·e^(-qT)·N(-d₁)
//!
//! where
//! - d₁ = (ln(S/K) + (r - q + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T

use super::distributions::norm_cdf;
use crate::ValuationError;
use deam_core::types::OptionRight;

/// Price a European option under Black-Scholes-Merton dynamics.
///
/// # Arguments
///
/// * `spot` - Spot price S (> 0)
/// * `strike` - Strike K (> 0)
/// * `ttm` - Time to maturity T in years (>= 0)
/// * `rate` - Continuously compounded risk-free rate r
/// * `dividend` - Continuously compounded dividend yield q
/// * `vol` - Volatility σ (>= 0)
/// * `right` - Call or put
///
/// Zero `ttm` or zero `vol` degenerate to the discounted intrinsic
/// value, which keeps the implied-vol objective well defined at the
/// bottom of its search range.
///
/// # Errors
///
/// - `ValuationError::InvalidInput` for non-positive S/K, negative T
///   or σ, or non-finite inputs
/// - `ValuationError::NonFinite` if the formula overflows
///
/// # Example
///
/// ```
/// use deam_core::types::OptionRight;
/// use deam_models::analytic::european_price;
///
/// let call = european_price(100.0, 100.0, 1.0, 0.05, 0.0, 0.2, OptionRight::Call).unwrap();
/// assert!((call - 10.4506).abs() < 1e-3);
/// ```
pub fn european_price(
    spot: f64,
    strike: f64,
    ttm: f64,
    rate: f64,
    dividend: f64,
    vol: f64,
    right: OptionRight,
) -> Result<f64, ValuationError> {
    if !(spot.is_finite() && strike.is_finite() && ttm.is_finite() && vol.is_finite())
        || !(rate.is_finite() && dividend.is_finite())
    {
        return Err(ValuationError::invalid_input("non-finite pricing input"));
    }
    if spot <= 0.0 || strike <= 0.0 {
        return Err(ValuationError::invalid_input(format!(
            "spot and strike must be positive: S = {spot}, K = {strike}"
        )));
    }
    if ttm < 0.0 || vol < 0.0 {
        return Err(ValuationError::invalid_input(format!(
            "ttm and vol must be non-negative: T = {ttm}, σ = {vol}"
        )));
    }

    let df_r = (-rate * ttm).exp();
    let df_q = (-dividend * ttm).exp();

    // Deterministic limit: forward intrinsic discounted back.
    if ttm == 0.0 || vol == 0.0 {
        let fwd = spot * df_q;
        let k_pv = strike * df_r;
        let price = match right {
            OptionRight::Call => (fwd - k_pv).max(0.0),
            OptionRight::Put => (k_pv - fwd).max(0.0),
        };
        return Ok(price);
    }

    let sqrt_t = ttm.sqrt();
    let vol_sqrt_t = vol * sqrt_t;
    let d1 = ((spot / strike).ln() + (rate - dividend + 0.5 * vol * vol) * ttm) / vol_sqrt_t;
    let d2 = d1 - vol_sqrt_t;

    let price = match right {
        OptionRight::Call => spot * df_q * norm_cdf(d1) - strike * df_r * norm_cdf(d2),
        OptionRight::Put => strike * df_r * norm_cdf(-d2) - spot * df_q * norm_cdf(-d1),
    };

    if !price.is_finite() {
        return Err(ValuationError::non_finite(format!(
            "european analytic price at σ = {vol}"
        )));
    }
    Ok(price.max(0.0))
}
