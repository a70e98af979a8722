//! Actual/365 date helpers.
//!
//! Year fractions are mapped to calendar dates by rounding to whole
//! days on an Act/365 basis, so a tenor survives a round trip through
//! a maturity date with at most half a day of drift. Every component
//! that threads an evaluation date uses these helpers, keeping one
//! consistent day count across de-Americanization, implied-vol
//! extraction and calibration.

use chrono::{Duration, NaiveDate};

/// Days per year under the Act/365 fixed convention.
const DAYS_PER_YEAR: f64 = 365.0;

/// Convert a year fraction to a whole-day tenor, minimum one day.
#[inline]
pub fn tenor_days(ttm_years: f64) -> i64 {
    ((ttm_years * DAYS_PER_YEAR).round() as i64).max(1)
}

/// Maturity date for a year fraction measured from `eval_date`.
#[inline]
pub fn maturity_date(eval_date: NaiveDate, ttm_years: f64) -> NaiveDate {
    eval_date + Duration::days(tenor_days(ttm_years))
}

/// Act/365 year fraction between two dates.
#[inline]
pub fn year_fraction(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / DAYS_PER_YEAR
}
