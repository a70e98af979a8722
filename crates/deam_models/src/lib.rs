//! # deam_models: Pricing Oracle
//!
//! Deterministic pricing formulas consumed by the policy layer:
//!
//! - Analytic Black-Scholes-Merton European prices with continuous
//!   dividend yield (`analytic`)
//! - Binomial lattice American/European prices across five tree
//!   families (`lattice`)
//! - Semi-analytical Heston European prices via characteristic
//!   function integration (`heston`)
//!
//! Every pricer is a pure function of its explicit inputs. Numerical
//! failure (a risk-neutral probability leaving [0, 1], a non-finite
//! node value) is a typed [`ValuationError`], never a panic, so a
//! caller's bracket search can treat "undefined at this σ" as a
//! routing signal.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytic;
mod error;
pub mod heston;
pub mod lattice;

pub use error::ValuationError;
