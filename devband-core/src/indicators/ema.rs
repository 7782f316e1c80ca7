//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1]
//! alpha = 2 / (span + 1).
//! Seed: EMA[0] = close[0]. There is no simple-average warm-up window, so the
//! first values are defined but dominated by the opening price.

use super::Indicator;
use crate::domain::PriceSeries;

/// Span of the long-horizon EMA every band is built around.
pub const DEFAULT_EMA_SPAN: usize = 200;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    /// A span of 0 is treated as 1.
    pub fn new(span: usize) -> Self {
        let span = span.max(1);
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }

    pub fn span(&self) -> usize {
        self.span
    }
}

impl Default for Ema {
    fn default() -> Self {
        Self::new(DEFAULT_EMA_SPAN)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, series: &PriceSeries) -> Vec<f64> {
        ema_of_series(&series.closes(), self.span)
    }
}

/// Compute EMA values from a pre-extracted f64 slice.
///
/// A NaN input carries the previous EMA forward; a NaN before the first real
/// value leaves the output NaN until a value arrives.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let mut prev: Option<f64> = None;

    values
        .iter()
        .map(|&v| {
            let next = match (prev, v.is_nan()) {
                (None, true) => f64::NAN,
                (None, false) => v,
                (Some(p), true) => p,
                (Some(p), false) => alpha * v + (1.0 - alpha) * p,
            };
            if !next.is_nan() {
                prev = Some(next);
            }
            next
        })
        .collect()
}

/// Raw deviation of each close from its reference value: `close[i] - line[i]`.
pub fn deviation(closes: &[f64], line: &[f64]) -> Vec<f64> {
    debug_assert_eq!(closes.len(), line.len(), "deviation inputs must align");
    closes.iter().zip(line).map(|(c, l)| c - l).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, DEFAULT_EPSILON};

    #[test]
    fn ema_span_1_equals_close() {
        let series = make_series(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&series);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn ema_seeds_from_first_close() {
        let series = make_series(&[42.5, 10.0, 11.0]);
        let result = Ema::default().compute(&series);
        assert_eq!(result[0], 42.5);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 2/(3+1) = 0.5
        // EMA[0] = 10
        // EMA[1] = 0.5*11 + 0.5*10 = 10.5
        // EMA[2] = 0.5*12 + 0.5*10.5 = 11.25
        let series = make_series(&[10.0, 11.0, 12.0]);
        let result = Ema::new(3).compute(&series);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert_approx(result[2], 11.25, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_200_alpha() {
        // alpha = 2/201
        let result = ema_of_series(&[100.0, 301.0], 200);
        assert_approx(result[1], 100.0 + 201.0 * 2.0 / 201.0, 1e-9);
    }

    #[test]
    fn ema_of_empty_is_empty() {
        assert!(ema_of_series(&[], 200).is_empty());
        assert!(Ema::default().compute(&PriceSeries::empty("X")).is_empty());
    }

    #[test]
    fn ema_nan_carries_previous_value() {
        let result = ema_of_series(&[10.0, f64::NAN, 12.0], 3);
        assert_approx(result[1], 10.0, DEFAULT_EPSILON);
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_leading_nan_stays_nan() {
        let result = ema_of_series(&[f64::NAN, 8.0], 3);
        assert!(result[0].is_nan());
        assert_eq!(result[1], 8.0);
    }

    #[test]
    fn deviation_is_close_minus_line() {
        assert_eq!(deviation(&[10.0, 8.0], &[9.0, 9.0]), vec![1.0, -1.0]);
    }

    #[test]
    fn ema_zero_span_is_span_one() {
        let series = make_series(&[5.0, 7.0, 6.0]);
        let ema = Ema::new(0);
        assert_eq!(ema.span(), 1);
        assert_eq!(ema.compute(&series), vec![5.0, 7.0, 6.0]);
    }

    #[test]
    fn ema_name() {
        assert_eq!(Ema::default().name(), "ema_200");
    }
}
