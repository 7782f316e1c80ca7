//! Indicators over a close-price series.
//!
//! Indicators are pure functions: series in, numeric series of the same
//! length out. Only the EMA is needed by the band builder.

pub mod ema;

pub use ema::{deviation, ema_of_series, Ema, DEFAULT_EMA_SPAN};

use crate::domain::PriceSeries;

/// Trait for indicators computed over a whole price series.
///
/// # Look-ahead contamination guard
/// No output value at index t may depend on a close from index t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_200").
    fn name(&self) -> &str;

    /// Compute the indicator for the entire series.
    ///
    /// Returns a `Vec<f64>` of the same length as `series`.
    fn compute(&self, series: &PriceSeries) -> Vec<f64>;
}

/// Build a series from close prices for testing, one point per calendar day.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> PriceSeries {
    use crate::domain::PricePoint;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint::new(base_date + chrono::Duration::days(i as i64), close))
        .collect();
    PriceSeries::new("TEST", points).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
