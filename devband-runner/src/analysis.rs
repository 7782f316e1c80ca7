//! Per-symbol pipeline: fetch → EMA → episodes → bands → classification.
//!
//! Nothing here is cached; every call recomputes from a fresh fetch. An empty
//! series or a failed fetch stops the pipeline for that symbol with an
//! `AnalysisError`, and both read as "no data" to the caller.

use chrono::NaiveDate;
use devband_core::bands::{check_condition, DeviationBands, TierClassification};
use devband_core::data::{fetch_with_backfill, DataError, DataProvider, DataSource};
use devband_core::domain::PriceSeries;
use thiserror::Error;

use crate::report::SymbolReport;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no data found for {symbol}")]
    EmptySeries { symbol: String },

    #[error("no data found for {symbol}: {source}")]
    Fetch {
        symbol: String,
        #[source]
        source: DataError,
    },
}

impl AnalysisError {
    pub fn symbol(&self) -> &str {
        match self {
            AnalysisError::EmptySeries { symbol } | AnalysisError::Fetch { symbol, .. } => symbol,
        }
    }
}

/// Resolved parameters for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub ema_span: usize,
    pub backfill_days: i64,
}

/// Everything computed for one symbol.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub series: PriceSeries,
    pub source: DataSource,
    pub bands: DeviationBands,
    /// Episodes below the average-deviation line, classified.
    pub avg_line_tier: TierClassification,
    /// Episodes below the lower tier line, classified.
    pub lower_line_tier: TierClassification,
}

impl Analysis {
    /// Run bands and classification over an already loaded series.
    pub fn from_series(
        series: PriceSeries,
        source: DataSource,
        ema_span: usize,
    ) -> Result<Self, AnalysisError> {
        if series.is_empty() {
            return Err(AnalysisError::EmptySeries {
                symbol: series.symbol.clone(),
            });
        }

        let bands = DeviationBands::build(&series, ema_span);
        let avg_line_tier = bands.avg_line_tier(&series);
        let lower_line_tier = bands.lower_line_tier(&series);

        Ok(Self {
            series,
            source,
            bands,
            avg_line_tier,
            lower_line_tier,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.series.symbol
    }

    /// The screening predicate on the latest bar.
    pub fn passes_screen(&self) -> bool {
        check_condition(&self.series, &self.bands)
    }

    pub fn report(&self) -> SymbolReport {
        SymbolReport::from_analysis(self)
    }
}

/// Fetch one symbol with backfill and run the full pipeline.
pub fn analyze_symbol(
    provider: &dyn DataProvider,
    symbol: &str,
    opts: &AnalysisOptions,
) -> Result<Analysis, AnalysisError> {
    let fetched = fetch_with_backfill(provider, symbol, opts.start, opts.end, opts.backfill_days)
        .map_err(|source| AnalysisError::Fetch {
            symbol: symbol.to_string(),
            source,
        })?;

    log::info!(
        "{symbol}: {} bars from {} ({}..={})",
        fetched.series.len(),
        provider.name(),
        opts.start,
        opts.end
    );

    Analysis::from_series(fetched.series, fetched.source, opts.ema_span)
}
