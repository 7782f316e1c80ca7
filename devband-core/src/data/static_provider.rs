//! In-memory provider for fixture series and failure injection.

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Entry {
    Points(Vec<PricePoint>),
    Failure(String),
}

/// Serves fixed price points per symbol, filtered to the requested range.
///
/// Symbols registered with `with_failure` return `DataError::NetworkUnreachable`;
/// unknown symbols return `DataError::SymbolNotFound`.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    entries: HashMap<String, Entry>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_points(mut self, symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        self.entries.insert(symbol.into(), Entry::Points(points));
        self
    }

    /// Register closes on consecutive calendar days starting at `first`.
    pub fn with_closes(self, symbol: impl Into<String>, first: NaiveDate, closes: &[f64]) -> Self {
        let points = closes
            .iter()
            .zip(first.iter_days())
            .map(|(&close, date)| PricePoint::new(date, close))
            .collect();
        self.with_points(symbol, points)
    }

    pub fn with_failure(mut self, symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        self.entries.insert(symbol.into(), Entry::Failure(reason.into()));
        self
    }
}

impl DataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        match self.entries.get(symbol) {
            Some(Entry::Points(points)) => {
                let in_range = points
                    .iter()
                    .filter(|p| p.date >= start && p.date <= end)
                    .copied()
                    .collect();
                Ok(FetchResult {
                    series: PriceSeries::from_unordered(symbol, in_range),
                    source: DataSource::Fixture,
                })
            }
            Some(Entry::Failure(reason)) => Err(DataError::NetworkUnreachable(reason.clone())),
            None => Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            }),
        }
    }
}
