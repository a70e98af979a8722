//! Heston model parameters and calibration seeds.

use serde::{Deserialize, Serialize};

/// Heston stochastic-volatility parameter set.
///
/// `dv = kappa (theta - v) dt + sigma sqrt(v) dW`, with correlation
/// `rho` between the variance and spot Brownian motions and initial
/// variance `v0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HestonParams {
    /// Initial variance v₀.
    pub v0: f64,
    /// Mean-reversion speed κ.
    pub kappa: f64,
    /// Long-run variance θ.
    pub theta: f64,
    /// Volatility of variance σ.
    pub sigma: f64,
    /// Spot/variance correlation ρ.
    pub rho: f64,
}

impl Default for HestonParams {
    /// Standard equity-index seed used to start every calibration.
    fn default() -> Self {
        Self {
            v0: 0.04,
            kappa: 1.5,
            theta: 0.04,
            sigma: 0.3,
            rho: -0.7,
        }
    }
}

impl HestonParams {
    /// Flatten to the optimiser's parameter vector
    /// `[v0, kappa, theta, sigma, rho]`.
    pub fn to_vec(self) -> Vec<f64> {
        vec![self.v0, self.kappa, self.theta, self.sigma, self.rho]
    }

    /// Rebuild from the optimiser's parameter vector.
    ///
    /// # Panics
    ///
    /// Panics if `v` has fewer than 5 entries; the optimiser owns the
    /// vector layout, so a short vector is a programming error.
    pub fn from_slice(v: &[f64]) -> Self {
        Self {
            v0: v[0],
            kappa: v[1],
            theta: v[2],
            sigma: v[3],
            rho: v[4],
        }
    }

    /// True when `2 κ θ > σ²`, keeping the variance process strictly
    /// positive.
    pub fn satisfies_feller(&self) -> bool {
        2.0 * self.kappa * self.theta > self.sigma * self.sigma
    }
}

/// Field-by-field override of the default calibration seed.
///
/// Each `Some` field replaces the corresponding default; `None` fields
/// keep it. This is the typed counterpart of passing a partial
/// parameter dictionary.
///
/// # Example
///
/// ```
/// use deam_models::heston::{HestonParams, HestonSeed};
///
/// let seed = HestonSeed {
///     v0: Some(0.09),
///     rho: Some(-0.5),
///     ..HestonSeed::default()
/// };
/// let params = seed.merge(HestonParams::default());
/// assert_eq!(params.v0, 0.09);
/// assert_eq!(params.kappa, 1.5); // default kept
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HestonSeed {
    /// Override for initial variance.
    pub v0: Option<f64>,
    /// Override for mean-reversion speed.
    pub kappa: Option<f64>,
    /// Override for long-run variance.
    pub theta: Option<f64>,
    /// Override for vol-of-vol.
    pub sigma: Option<f64>,
    /// Override for correlation.
    pub rho: Option<f64>,
}

impl HestonSeed {
    /// Apply the overrides on top of `base`.
    pub fn merge(self, base: HestonParams) -> HestonParams {
        HestonParams {
            v0: self.v0.unwrap_or(base.v0),
            kappa: self.kappa.unwrap_or(base.kappa),
            theta: self.theta.unwrap_or(base.theta),
            sigma: self.sigma.unwrap_or(base.sigma),
            rho: self.rho.unwrap_or(base.rho),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seed_values() {
        let p = HestonParams::default();
        assert_eq!(p.v0, 0.04);
        assert_eq!(p.kappa, 1.5);
        assert_eq!(p.theta, 0.04);
        assert_eq!(p.sigma, 0.3);
        assert_eq!(p.rho, -0.7);
    }

    #[test]
    fn test_vec_round_trip() {
        let p = HestonParams::default();
        assert_eq!(HestonParams::from_slice(&p.to_vec()), p);
    }

    #[test]
    fn test_empty_seed_keeps_defaults() {
        let merged = HestonSeed::default().merge(HestonParams::default());
        assert_eq!(merged, HestonParams::default());
    }

    #[test]
    fn test_partial_seed_overrides() {
        let seed = HestonSeed {
            kappa: Some(2.0),
            ..HestonSeed::default()
        };
        let merged = seed.merge(HestonParams::default());
        assert_eq!(merged.kappa, 2.0);
        assert_eq!(merged.v0, 0.04);
    }

    #[test]
    fn test_feller_condition() {
        assert!(HestonParams::default().satisfies_feller()); // 2*1.5*0.04 = 0.12 > 0.09
        let violating = HestonParams {
            sigma: 1.0,
            ..HestonParams::default()
        };
        assert!(!violating.satisfies_feller());
    }
}
