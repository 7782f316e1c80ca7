//! Offline price history from `<dir>/<SYMBOL>.csv`.
//!
//! Accepts either a minimal `date,close` file or a Yahoo-style export
//! (`Date,Open,High,Low,Close,Adj Close,Volume`). Header matching is
//! case-insensitive; `Adj Close` is preferred over `Close` when present.
//! Dates may carry a time suffix (`2024-01-02 00:00:00+05:30`); only the
//! leading `YYYY-MM-DD` is read.

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    /// Read every row of a price file.
    pub fn read_file(path: &Path) -> Result<Vec<PricePoint>, DataError> {
        let err = |reason: String| DataError::CsvImport {
            path: path.display().to_string(),
            reason,
        };

        let mut reader = csv::Reader::from_path(path).map_err(|e| err(e.to_string()))?;
        let headers = reader.headers().map_err(|e| err(e.to_string()))?.clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let date_col = find("date").ok_or_else(|| err("missing 'date' column".into()))?;
        let close_col = find("adj close")
            .or_else(|| find("adj_close"))
            .or_else(|| find("close"))
            .ok_or_else(|| err("missing 'close' column".into()))?;

        let mut points = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| err(e.to_string()))?;
            let raw_date = record.get(date_col).unwrap_or("").trim();
            let date = raw_date
                .get(..10)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                .ok_or_else(|| err(format!("row {}: bad date '{raw_date}'", row + 1)))?;

            // Empty or "null" closes mark non-trading days in Yahoo exports.
            let raw_close = record.get(close_col).unwrap_or("").trim();
            if raw_close.is_empty() || raw_close.eq_ignore_ascii_case("null") {
                continue;
            }
            let close: f64 = raw_close
                .parse()
                .map_err(|_| err(format!("row {}: bad close '{raw_close}'", row + 1)))?;
            points.push(PricePoint::new(date, close));
        }

        Ok(points)
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let mut points = Self::read_file(&path)?;
        points.retain(|p| p.date >= start && p.date <= end);
        Ok(FetchResult {
            series: PriceSeries::from_unordered(symbol, points),
            source: DataSource::CsvImport,
        })
    }
}
