//! Binomial tree family catalogue.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Binomial tree parameterisation family.
///
/// Each family fixes a different (u, d, p) discretisation of the
/// risk-neutral dynamics. They agree in the continuum limit but differ
/// in stability at extreme volatilities, which is why the
/// de-Americanization engine falls back across families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeFamily {
    /// Jarrow-Rudd equal-probability tree.
    JarrowRudd,
    /// Trigeorgis log-spaced tree.
    Trigeorgis,
    /// Tian moment-matching tree.
    Tian,
    /// Cox-Ross-Rubinstein tree.
    CoxRossRubinstein,
    /// Leisen-Reimer tree (Peizer-Pratt inversion, odd step counts).
    LeisenReimer,
}

impl TreeFamily {
    /// Canonical fallback order tried by the de-Americanization engine.
    pub const CATALOG: [TreeFamily; 5] = [
        TreeFamily::JarrowRudd,
        TreeFamily::Trigeorgis,
        TreeFamily::Tian,
        TreeFamily::CoxRossRubinstein,
        TreeFamily::LeisenReimer,
    ];

    /// Short market name of the family.
    pub fn name(self) -> &'static str {
        match self {
            TreeFamily::JarrowRudd => "jr",
            TreeFamily::Trigeorgis => "trigeorgis",
            TreeFamily::Tian => "tian",
            TreeFamily::CoxRossRubinstein => "crr",
            TreeFamily::LeisenReimer => "lr",
        }
    }

    /// Step count adjusted for family constraints.
    ///
    /// Leisen-Reimer requires an odd number of steps; even counts are
    /// bumped up by one. Other families use the count unchanged.
    pub fn effective_steps(self, steps: usize) -> usize {
        if self == TreeFamily::LeisenReimer && steps % 2 == 0 {
            steps + 1
        } else {
            steps
        }
    }
}

impl fmt::Display for TreeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TreeFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jr" | "jarrow-rudd" | "jarrowrudd" => Ok(TreeFamily::JarrowRudd),
            "trigeorgis" => Ok(TreeFamily::Trigeorgis),
            "tian" => Ok(TreeFamily::Tian),
            "crr" | "cox-ross-rubinstein" => Ok(TreeFamily::CoxRossRubinstein),
            "lr" | "leisen-reimer" | "leisenreimer" => Ok(TreeFamily::LeisenReimer),
            other => Err(format!("unknown tree family: {other}")),
        }
    }
}
