//! Same-day backfill reconciliation.
//!
//! A daily download often lags the most recent session. When the primary
//! fetch ends before the requested end date, the trailing few days are
//! fetched again and merged in by date. On a date present in both, the
//! primary value is kept; the backfill only contributes dates the primary
//! fetch missed. A failed backfill is logged and the primary series is used
//! as is.

use super::provider::{DataError, DataProvider, FetchResult};
use crate::domain::{PricePoint, PriceSeries};
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;

/// Number of trailing calendar days re-fetched by the backfill.
pub const DEFAULT_BACKFILL_DAYS: i64 = 5;

/// Fetch `[start, end]` and reconcile the trailing `backfill_days`.
///
/// An empty primary series is returned unchanged; there is nothing to extend.
pub fn fetch_with_backfill(
    provider: &dyn DataProvider,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    backfill_days: i64,
) -> Result<FetchResult, DataError> {
    let primary = provider.fetch(symbol, start, end)?;

    let Some(last) = primary.series.latest().map(|p| p.date) else {
        return Ok(primary);
    };
    if backfill_days <= 0 || last >= end {
        return Ok(primary);
    }

    let backfill_start = end
        .checked_sub_days(Days::new(backfill_days.unsigned_abs()))
        .unwrap_or(start)
        .max(start);
    log::debug!("{symbol}: primary ends {last}, backfilling {backfill_start}..={end}");

    match provider.fetch(symbol, backfill_start, end) {
        Ok(backfill) => {
            let before = primary.series.len();
            let series = merge_backfill(primary.series, backfill.series);
            if series.len() > before {
                log::info!("{symbol}: backfill added {} bar(s)", series.len() - before);
            }
            Ok(FetchResult {
                series,
                source: primary.source,
            })
        }
        Err(e) => {
            log::warn!("{symbol}: backfill fetch failed, using primary series: {e}");
            Ok(primary)
        }
    }
}

/// Merge two series by date. Primary values win on duplicate dates.
pub fn merge_backfill(primary: PriceSeries, backfill: PriceSeries) -> PriceSeries {
    let symbol = primary.symbol.clone();
    let mut by_date: BTreeMap<NaiveDate, f64> = backfill
        .into_points()
        .into_iter()
        .map(|p| (p.date, p.close))
        .collect();
    by_date.extend(primary.into_points().into_iter().map(|p| (p.date, p.close)));

    let points = by_date
        .into_iter()
        .map(|(date, close)| PricePoint::new(date, close))
        .collect();
    PriceSeries::from_unordered(symbol, points)
}
