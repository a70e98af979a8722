//! Per-group Heston calibration.
//!
//! A calibration group is a basket of quotes sharing an underlying and
//! evaluation date. Each member contributes one helper (its implied
//! vol restated as a Black-Scholes target price); the five Heston
//! parameters are then fitted by damped least squares over the
//! helpers' pricing errors, and every member is repriced under the
//! fitted model.

use crate::implied_vol::{implied_vol, ImpliedVolConfig};
use crate::oracle::{PricingOracle, VanillaSpec};
use crate::EngineError;
use chrono::NaiveDate;
use deam_core::math::solvers::{LMConfig, LevenbergMarquardtSolver};
use deam_core::market::{FlatCurve, YieldCurve};
use deam_core::types::{maturity_date, year_fraction, Quote};
use deam_models::heston::{HestonParams, HestonSeed};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Quotes sharing a grouping key.
///
/// By convention all members share spot, rate and dividend; those are
/// taken from the first row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationGroup {
    /// Attribution label, e.g. underlying ticker plus trade date.
    pub label: String,
    /// Member quotes, in caller order.
    pub quotes: Vec<Quote>,
}

impl CalibrationGroup {
    /// Create a group from a label and its member quotes.
    pub fn new(label: impl Into<String>, quotes: Vec<Quote>) -> Self {
        Self {
            label: label.into(),
            quotes,
        }
    }
}

/// Box constraints applied to the parameter vector inside the
/// optimiser's residual function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HestonBounds {
    /// Bounds on initial variance.
    pub v0: (f64, f64),
    /// Bounds on mean-reversion speed.
    pub kappa: (f64, f64),
    /// Bounds on long-run variance.
    pub theta: (f64, f64),
    /// Bounds on vol-of-vol.
    pub sigma: (f64, f64),
    /// Bounds on correlation.
    pub rho: (f64, f64),
}

impl Default for HestonBounds {
    fn default() -> Self {
        Self {
            v0: (1e-6, 1.0),
            kappa: (0.01, 20.0),
            theta: (1e-6, 1.0),
            sigma: (0.01, 2.0),
            rho: (-0.999, 0.999),
        }
    }
}

impl HestonBounds {
    /// Clamp a raw optimiser vector into the admissible box.
    pub fn clamp(&self, p: &[f64]) -> HestonParams {
        HestonParams {
            v0: p[0].clamp(self.v0.0, self.v0.1),
            kappa: p[1].clamp(self.kappa.0, self.kappa.1),
            theta: p[2].clamp(self.theta.0, self.theta.1),
            sigma: p[3].clamp(self.sigma.0, self.sigma.1),
            rho: p[4].clamp(self.rho.0, self.rho.1),
        }
    }
}

/// Configuration of a group calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HestonCalibrationConfig {
    /// Minimum count of valid helpers required to attempt a fit.
    pub min_helpers: usize,
    /// Optimiser end criteria.
    pub lm: LMConfig,
    /// Parameter box constraints.
    pub bounds: HestonBounds,
    /// Seed overrides merged over the default parameters.
    pub seed: HestonSeed,
    /// Implied-vol extraction settings for the helper build.
    pub iv: ImpliedVolConfig,
}

impl Default for HestonCalibrationConfig {
    fn default() -> Self {
        Self {
            min_helpers: 5,
            lm: LMConfig::new(1e-8, 500, 50),
            bounds: HestonBounds::default(),
            seed: HestonSeed::default(),
            iv: ImpliedVolConfig::default(),
        }
    }
}

/// One market observation encoded as a calibration constraint.
#[derive(Debug, Clone, PartialEq)]
struct Helper {
    spec: VanillaSpec,
    implied_vol: f64,
    target_price: f64,
}

/// Fitted model plus fit diagnostics for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct HestonFit {
    /// Fitted parameters.
    pub params: HestonParams,
    /// Root mean squared pricing error over the helpers.
    pub rmse: f64,
    /// Optimiser iterations performed.
    pub iterations: usize,
    /// Whether an end criterion other than the iteration cap fired.
    pub converged: bool,
    /// Helpers that entered the fit.
    pub helpers: usize,
}

/// Fit and repriced quotes for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupResult {
    /// The fitted model and diagnostics.
    pub fit: HestonFit,
    /// One European-equivalent model price per member quote, index
    /// aligned with the group; `None` where repricing failed.
    pub prices: Vec<Option<f64>>,
}

/// Calibrate the Heston model to one group of quotes.
///
/// Spot, rate and dividend come from the group's first row. Every
/// member runs through implied-vol extraction (de-Americanization
/// included); members whose extraction fails are dropped. The fit
/// proceeds only if at least `min_helpers` helpers survive.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] for an empty group
/// - [`EngineError::InsufficientCalibrationData`] below the helper
///   minimum
/// - [`EngineError::NumericalFailure`] if the optimiser itself fails
pub fn calibrate_group(
    oracle: &dyn PricingOracle,
    group: &CalibrationGroup,
    eval_date: NaiveDate,
    config: &HestonCalibrationConfig,
) -> Result<HestonFit, EngineError> {
    let first = group.quotes.first().ok_or_else(|| {
        EngineError::InvalidInput(format!("empty calibration group {:?}", group.label))
    })?;

    let spot = first.spot;
    let rate_curve = FlatCurve::new(first.rate);
    let dividend_curve = FlatCurve::new(first.dividend_yield());

    let helpers = build_helpers(oracle, group, eval_date, spot, &rate_curve, &dividend_curve, config)?;
    if helpers.len() < config.min_helpers {
        warn!(
            group = %group.label,
            provided = helpers.len(),
            required = config.min_helpers,
            "calibration refused"
        );
        return Err(EngineError::InsufficientCalibrationData {
            required: config.min_helpers,
            provided: helpers.len(),
        });
    }

    let (iv_lo, iv_hi) = helpers
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), h| {
            (lo.min(h.implied_vol), hi.max(h.implied_vol))
        });
    debug!(group = %group.label, iv_lo, iv_hi, "implied vol range entering fit");

    let seed = config.seed.merge(HestonParams::default());
    let bounds = config.bounds;

    let residuals = |p: &[f64]| -> Vec<f64> {
        let params = bounds.clamp(p);
        helpers
            .iter()
            .map(|h| match oracle.heston_price(&h.spec, &params) {
                Ok(price) => price - h.target_price,
                Err(_) => f64::NAN,
            })
            .collect()
    };

    let solver = LevenbergMarquardtSolver::new(config.lm);
    let result = solver
        .solve(residuals, seed.to_vec())
        .map_err(|e| EngineError::NumericalFailure(e.to_string()))?;

    let fit = HestonFit {
        params: bounds.clamp(&result.params),
        rmse: result.rmse(helpers.len()),
        iterations: result.iterations,
        converged: result.converged,
        helpers: helpers.len(),
    };
    info!(
        group = %group.label,
        helpers = fit.helpers,
        rmse = fit.rmse,
        iterations = fit.iterations,
        "group calibrated"
    );
    Ok(fit)
}

/// Reprice every group member under a fitted model.
///
/// A repricing failure on one quote never aborts the group; the slot
/// is reported as `None` and the rest proceed. Output is index aligned
/// with `group.quotes`.
pub fn price_group(
    oracle: &dyn PricingOracle,
    group: &CalibrationGroup,
    params: &HestonParams,
) -> Vec<Option<f64>> {
    let Some(first) = group.quotes.first() else {
        return Vec::new();
    };
    let spot = first.spot;
    let rate = first.rate;
    let dividend = first.dividend_yield();

    group
        .quotes
        .iter()
        .map(|quote| {
            let spec = VanillaSpec {
                spot,
                strike: quote.strike,
                ttm: quote.ttm,
                rate,
                dividend,
                right: quote.right,
            };
            match oracle.heston_price(&spec, params) {
                Ok(price) if price.is_finite() => Some(price),
                Ok(price) => {
                    debug!(strike = quote.strike, price, "non-finite model price skipped");
                    None
                }
                Err(err) => {
                    debug!(strike = quote.strike, %err, "model repricing failed");
                    None
                }
            }
        })
        .collect()
}

/// Calibrate and reprice a batch of independent groups in parallel.
///
/// Groups are embarrassingly parallel: no shared mutable state, the
/// evaluation date is passed by value. Output is index aligned with
/// `groups`; a failed group yields `None` without affecting the rest.
pub fn calibrate_and_price(
    oracle: &dyn PricingOracle,
    groups: &[CalibrationGroup],
    eval_date: NaiveDate,
    config: &HestonCalibrationConfig,
) -> Vec<Option<GroupResult>> {
    groups
        .par_iter()
        .map(|group| match calibrate_group(oracle, group, eval_date, config) {
            Ok(fit) => {
                let prices = price_group(oracle, group, &fit.params);
                Some(GroupResult { fit, prices })
            }
            Err(err) => {
                warn!(group = %group.label, %err, "group skipped");
                None
            }
        })
        .collect()
}

/// Build one helper per quote whose implied vol can be extracted.
#[allow(clippy::too_many_arguments)]
fn build_helpers(
    oracle: &dyn PricingOracle,
    group: &CalibrationGroup,
    eval_date: NaiveDate,
    spot: f64,
    rate_curve: &FlatCurve,
    dividend_curve: &FlatCurve,
    config: &HestonCalibrationConfig,
) -> Result<Vec<Helper>, EngineError> {
    let mut helpers = Vec::with_capacity(group.quotes.len());

    for quote in &group.quotes {
        let vol = match implied_vol(oracle, quote, &config.iv) {
            Ok(v) => v,
            Err(err) => {
                debug!(strike = quote.strike, %err, "quote dropped from calibration");
                continue;
            }
        };

        // Maturities snap to a whole-day tenor from the evaluation
        // date, matching the lattice pricer's day-count convention.
        let maturity = maturity_date(eval_date, quote.ttm);
        let ttm = year_fraction(eval_date, maturity);
        let spec = VanillaSpec {
            spot,
            strike: quote.strike,
            ttm,
            rate: rate_curve.yield_at(ttm),
            dividend: dividend_curve.yield_at(ttm),
            right: quote.right,
        };
        let target_price = match oracle.european_price(&spec, vol) {
            Ok(price) if price.is_finite() && price > 0.0 => price,
            _ => {
                debug!(strike = quote.strike, vol, "target price unusable, quote dropped");
                continue;
            }
        };

        debug!(
            strike = quote.strike,
            vol, target_price, "calibration helper built"
        );
        helpers.push(Helper {
            spec,
            implied_vol: vol,
            target_price,
        });
    }

    debug!(
        group = %group.label,
        helpers = helpers.len(),
        members = group.quotes.len(),
        "helper build finished"
    );
    Ok(helpers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::ModelOracle;
    use deam_core::types::OptionRight;
    use deam_models::ValuationError;

    fn eval_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    /// Calls with zero dividend take the de-Americanization shortcut,
    /// so helper construction involves no tree pricing at all.
    fn synthetic_group(params: &HestonParams, strikes: &[f64]) -> CalibrationGroup {
        let oracle = ModelOracle;
        let quotes = strikes
            .iter()
            .map(|&strike| {
                let spec = VanillaSpec {
                    spot: 100.0,
                    strike,
                    ttm: 1.0,
                    rate: 0.03,
                    dividend: 0.0,
                    right: OptionRight::Call,
                };
                let mid = oracle.heston_price(&spec, params).unwrap();
                Quote::new(100.0, strike, 1.0, 0.03, 0.0, OptionRight::Call, mid)
            })
            .collect();
        CalibrationGroup::new("SYN/2024-03-15", quotes)
    }

    #[test]
    fn test_four_helpers_insufficient_five_proceed() {
        let oracle = ModelOracle;
        let params = HestonParams::default();
        let config = HestonCalibrationConfig::default();

        let four = synthetic_group(&params, &[90.0, 95.0, 100.0, 105.0]);
        let result = calibrate_group(&oracle, &four, eval_date(), &config);
        assert!(matches!(
            result,
            Err(EngineError::InsufficientCalibrationData {
                required: 5,
                provided: 4,
            })
        ));

        let five = synthetic_group(&params, &[90.0, 95.0, 100.0, 105.0, 110.0]);
        let fit = calibrate_group(&oracle, &five, eval_date(), &config).unwrap();
        assert_eq!(fit.helpers, 5);
    }

    #[test]
    fn test_unusable_quotes_are_dropped_not_fatal() {
        let oracle = ModelOracle;
        let params = HestonParams::default();
        let config = HestonCalibrationConfig::default();

        let mut group = synthetic_group(&params, &[90.0, 95.0, 100.0, 105.0, 110.0]);
        // A sixth, arbitrage-violating quote must be dropped silently.
        group
            .quotes
            .push(Quote::new(100.0, 100.0, 1.0, 0.03, 0.0, OptionRight::Call, 500.0));
        let fit = calibrate_group(&oracle, &group, eval_date(), &config).unwrap();
        assert_eq!(fit.helpers, 5);
    }

    #[test]
    fn test_fit_reprices_market_closely() {
        let oracle = ModelOracle;
        let generating = HestonParams::default();
        let group = synthetic_group(&generating, &[85.0, 90.0, 95.0, 100.0, 105.0, 110.0, 115.0]);
        let config = HestonCalibrationConfig::default();

        let fit = calibrate_group(&oracle, &group, eval_date(), &config).unwrap();
        // Prices were generated by the model itself; the fit must
        // reprice them tightly even if individual parameters wander.
        assert!(fit.rmse < 0.05, "rmse = {}", fit.rmse);

        let prices = price_group(&oracle, &group, &fit.params);
        assert_eq!(prices.len(), group.quotes.len());
        for (quote, price) in group.quotes.iter().zip(&prices) {
            let price = price.unwrap();
            assert!((price - quote.mid).abs() < 0.25, "strike {}", quote.strike);
        }
    }

    #[test]
    fn test_seed_override_is_used() {
        let oracle = ModelOracle;
        let group = synthetic_group(&HestonParams::default(), &[90.0, 95.0, 100.0, 105.0, 110.0]);
        let config = HestonCalibrationConfig {
            seed: HestonSeed {
                v0: Some(0.09),
                ..HestonSeed::default()
            },
            ..HestonCalibrationConfig::default()
        };
        // Just exercises the merged-seed path end to end.
        let fit = calibrate_group(&oracle, &group, eval_date(), &config).unwrap();
        assert!(fit.params.v0 > 0.0);
    }

    #[test]
    fn test_empty_group_rejected() {
        let oracle = ModelOracle;
        let group = CalibrationGroup::new("EMPTY", Vec::new());
        let result = calibrate_group(&oracle, &group, eval_date(), &HestonCalibrationConfig::default());
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    /// Oracle failing Heston pricing for one specific strike.
    struct OneBadStrike(f64);

    impl PricingOracle for OneBadStrike {
        fn american_price(
            &self,
            spec: &VanillaSpec,
            vol: f64,
            family: deam_models::lattice::TreeFamily,
            steps: usize,
        ) -> Result<f64, ValuationError> {
            ModelOracle.american_price(spec, vol, family, steps)
        }

        fn european_price(&self, spec: &VanillaSpec, vol: f64) -> Result<f64, ValuationError> {
            ModelOracle.european_price(spec, vol)
        }

        fn heston_price(
            &self,
            spec: &VanillaSpec,
            params: &HestonParams,
        ) -> Result<f64, ValuationError> {
            if (spec.strike - self.0).abs() < 1e-12 {
                return Err(ValuationError::non_finite("injected"));
            }
            ModelOracle.heston_price(spec, params)
        }
    }

    #[test]
    fn test_single_repricing_failure_is_isolated() {
        let oracle = OneBadStrike(95.0);
        let group = synthetic_group(&HestonParams::default(), &[90.0, 95.0, 100.0]);
        let prices = price_group(&oracle, &group, &HestonParams::default());
        assert_eq!(prices.len(), 3);
        assert!(prices[0].is_some());
        assert!(prices[1].is_none());
        assert!(prices[2].is_some());
    }

    #[test]
    fn test_batch_is_index_stable_and_isolated() {
        let oracle = ModelOracle;
        let params = HestonParams::default();
        let good = synthetic_group(&params, &[90.0, 95.0, 100.0, 105.0, 110.0]);
        let thin = synthetic_group(&params, &[100.0, 105.0]);
        let groups = vec![thin.clone(), good.clone(), thin];

        let results = calibrate_and_price(
            &oracle,
            &groups,
            eval_date(),
            &HestonCalibrationConfig::default(),
        );
        assert_eq!(results.len(), 3);
        assert!(results[0].is_none());
        assert!(results[2].is_none());
        let middle = results[1].as_ref().unwrap();
        assert_eq!(middle.prices.len(), good.quotes.len());
    }
}
