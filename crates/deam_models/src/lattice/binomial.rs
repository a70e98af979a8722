//! Backward-induction binomial pricer.

use super::TreeFamily;
use crate::ValuationError;
use deam_core::types::OptionRight;

/// One-step lattice parameterisation: up factor, down factor and
/// up-move probability.
#[derive(Debug, Clone, Copy)]
struct StepParams {
    u: f64,
    d: f64,
    p: f64,
}

/// Price an American option on a binomial lattice.
///
/// Builds the (u, d, p) parameterisation for the requested family and
/// rolls back with early exercise at every node.
///
/// # Errors
///
/// - `ValuationError::InvalidInput` for non-positive S/K/T/σ or zero steps
/// - `ValuationError::InvalidProbability` when the family's risk-neutral
///   probability leaves [0, 1] at this σ
/// - `ValuationError::NonFinite` when a node value overflows
///
/// # Example
///
/// ```
/// use deam_core::types::OptionRight;
/// use deam_models::lattice::{american_price, TreeFamily};
///
/// let p = american_price(
///     100.0, 100.0, 1.0, 0.05, 0.02, 0.2,
///     OptionRight::Put, TreeFamily::CoxRossRubinstein, 200,
/// ).unwrap();
/// assert!(p > 0.0);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn american_price(
    spot: f64,
    strike: f64,
    ttm: f64,
    rate: f64,
    dividend: f64,
    vol: f64,
    right: OptionRight,
    family: TreeFamily,
    steps: usize,
) -> Result<f64, ValuationError> {
    lattice_price(
        spot, strike, ttm, rate, dividend, vol, right, family, steps, true,
    )
}

/// Price a European option on the same lattice.
///
/// Primarily a convergence check against the analytic formula; the
/// engine's European leg uses [`crate::analytic::european_price`].
#[allow(clippy::too_many_arguments)]
pub fn european_lattice_price(
    spot: f64,
    strike: f64,
    ttm: f64,
    rate: f64,
    dividend: f64,
    vol: f64,
    right: OptionRight,
    family: TreeFamily,
    steps: usize,
) -> Result<f64, ValuationError> {
    lattice_price(
        spot, strike, ttm, rate, dividend, vol, right, family, steps, false,
    )
}

#[allow(clippy::too_many_arguments)]
fn lattice_price(
    spot: f64,
    strike: f64,
    ttm: f64,
    rate: f64,
    dividend: f64,
    vol: f64,
    right: OptionRight,
    family: TreeFamily,
    steps: usize,
    american: bool,
) -> Result<f64, ValuationError> {
    if steps == 0 {
        return Err(ValuationError::invalid_input("steps must be > 0"));
    }
    if !(spot.is_finite() && strike.is_finite() && ttm.is_finite() && vol.is_finite()) {
        return Err(ValuationError::invalid_input("non-finite lattice input"));
    }
    if spot <= 0.0 || strike <= 0.0 || ttm <= 0.0 || vol <= 0.0 {
        return Err(ValuationError::invalid_input(format!(
            "lattice inputs must be positive: S = {spot}, K = {strike}, T = {ttm}, σ = {vol}"
        )));
    }

    let n = family.effective_steps(steps);
    let dt = ttm / n as f64;
    let StepParams { u, d, p } = step_params(family, spot, strike, ttm, rate, dividend, vol, n, dt)?;

    if !(u.is_finite() && d.is_finite() && u > 0.0 && d > 0.0) {
        return Err(ValuationError::non_finite(format!(
            "lattice factors at σ = {vol}: u = {u}, d = {d}"
        )));
    }
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(ValuationError::InvalidProbability { p });
    }

    let disc = (-rate * dt).exp();

    // Terminal layer
    let mut values: Vec<f64> = (0..=n)
        .map(|j| {
            let st = spot * u.powi(j as i32) * d.powi((n - j) as i32);
            right.payoff(st, strike)
        })
        .collect();

    for i in (0..n).rev() {
        for j in 0..=i {
            let continuation = disc * (p * values[j + 1] + (1.0 - p) * values[j]);
            values[j] = if american {
                let st = spot * u.powi(j as i32) * d.powi((i - j) as i32);
                continuation.max(right.payoff(st, strike))
            } else {
                continuation
            };
        }
    }

    let price = values[0];
    if !price.is_finite() {
        return Err(ValuationError::non_finite(format!(
            "lattice root node at σ = {vol}"
        )));
    }
    Ok(price)
}

#[allow(clippy::too_many_arguments)]
fn step_params(
    family: TreeFamily,
    spot: f64,
    strike: f64,
    ttm: f64,
    rate: f64,
    dividend: f64,
    vol: f64,
    n: usize,
    dt: f64,
) -> Result<StepParams, ValuationError> {
    let growth = ((rate - dividend) * dt).exp();
    let drift = rate - dividend - 0.5 * vol * vol;

    let params = match family {
        TreeFamily::CoxRossRubinstein => {
            let u = (vol * dt.sqrt()).exp();
            let d = 1.0 / u;
            StepParams {
                u,
                d,
                p: (growth - d) / (u - d),
            }
        }
        TreeFamily::JarrowRudd => {
            let u = (drift * dt + vol * dt.sqrt()).exp();
            let d = (drift * dt - vol * dt.sqrt()).exp();
            StepParams { u, d, p: 0.5 }
        }
        TreeFamily::Trigeorgis => {
            let dx = (vol * vol * dt + (drift * dt).powi(2)).sqrt();
            StepParams {
                u: dx.exp(),
                d: (-dx).exp(),
                p: 0.5 + 0.5 * drift * dt / dx,
            }
        }
        TreeFamily::Tian => {
            let v = (vol * vol * dt).exp();
            let root = (v * v + 2.0 * v - 3.0).sqrt();
            let u = 0.5 * growth * v * (v + 1.0 + root);
            let d = 0.5 * growth * v * (v + 1.0 - root);
            StepParams {
                u,
                d,
                p: (growth - d) / (u - d),
            }
        }
        TreeFamily::LeisenReimer => {
            let sqrt_t = ttm.sqrt();
            let d1 = ((spot / strike).ln() + (rate - dividend + 0.5 * vol * vol) * ttm)
                / (vol * sqrt_t);
            let d2 = d1 - vol * sqrt_t;
            let p = peizer_pratt(d2, n);
            let p_bar = peizer_pratt(d1, n);
            if p <= 0.0 || p >= 1.0 {
                return Err(ValuationError::InvalidProbability { p });
            }
            let u = growth * p_bar / p;
            let d = (growth - p * u) / (1.0 - p);
            StepParams { u, d, p }
        }
    };
    Ok(params)
}

/// Peizer-Pratt method-2 inversion of the binomial CDF.
fn peizer_pratt(z: f64, n: usize) -> f64 {
    let n = n as f64;
    let a = z / (n + 1.0 / 3.0 + 0.1 / (n + 1.0));
    let inner = -(a * a) * (n + 1.0 / 6.0);
    0.5 + 0.5 * z.signum() * (1.0 - inner.exp()).max(0.0).sqrt()
}
