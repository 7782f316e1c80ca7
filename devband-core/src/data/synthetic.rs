//! Deterministic random-walk closes for offline demos.
//!
//! The walk is seeded from a BLAKE3 hash of the symbol, so a symbol always
//! gets the same series and different symbols get different ones. Results
//! computed on this data are tagged `DataSource::Synthetic`.

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::{PricePoint, PriceSeries};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    start_price: f64,
    /// Daily drift added to the uniform return draw.
    drift: f64,
    volatility: f64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            start_price: 100.0,
            drift: 0.0004,
            volatility: 0.02,
        }
    }
}

impl SyntheticProvider {
    pub fn new(start_price: f64, drift: f64, volatility: f64) -> Self {
        Self {
            start_price,
            drift,
            volatility,
        }
    }

    /// Weekday closes from `start` to `end` inclusive.
    pub fn generate(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut points = Vec::new();
        let mut price = self.start_price;
        let mut current = start;

        while current <= end {
            if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                let shock: f64 = if self.volatility > 0.0 {
                    rng.gen_range(-self.volatility..self.volatility)
                } else {
                    0.0
                };
                price *= 1.0 + self.drift + shock;
                points.push(PricePoint::new(current, price));
            }
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }

        points
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let series = PriceSeries::new(symbol, self.generate(symbol, start, end))?;
        Ok(FetchResult {
            series,
            source: DataSource::Synthetic,
        })
    }
}
