//! Per-symbol summary report.
//!
//! Values are taken at the latest bar. Every tier-derived value is an
//! `Option`: an undefined average deviation stays visible as "n/a" in the
//! rendered report instead of silently becoming zero.

use chrono::NaiveDate;
use devband_core::bands::{ClassifiedEpisode, LineKind, TierClassification};
use devband_core::data::DataSource;
use serde::Serialize;

use crate::analysis::Analysis;

/// Current schema version for the JSON report.
pub const SCHEMA_VERSION: u32 = 1;

/// An absolute difference and the same difference as a percent of a base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Diff {
    pub absolute: Option<f64>,
    pub percent: Option<f64>,
}

impl Diff {
    /// `(a - b)` and `(a - b) / base * 100`.
    fn of(a: Option<f64>, b: Option<f64>, base: Option<f64>) -> Self {
        let absolute = a.zip(b).map(|(a, b)| a - b);
        let percent = absolute.zip(base).map(|(d, base)| d / base * 100.0);
        Self { absolute, percent }
    }
}

/// Price range between the average-deviation line and a lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntryRange {
    pub from: Option<f64>,
    pub to: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierReport {
    pub line: LineKind,
    pub mean: Option<f64>,
    pub mean_excluding_highlighted: Option<f64>,
    pub episodes: Vec<ClassifiedEpisode>,
    pub highlighted: Vec<ClassifiedEpisode>,
}

impl From<&TierClassification> for TierReport {
    fn from(tier: &TierClassification) -> Self {
        Self {
            line: tier.line,
            mean: tier.mean,
            mean_excluding_highlighted: tier.mean_excluding_highlighted,
            episodes: tier.episodes.clone(),
            highlighted: tier.highlighted().copied().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolReport {
    pub schema_version: u32,
    pub symbol: String,
    pub source: DataSource,
    pub bar_count: usize,
    pub latest_date: NaiveDate,
    pub latest_close: f64,
    pub latest_ema: f64,
    pub avg_deviation_line: Option<f64>,
    pub avg_below_avg_deviation_line: Option<f64>,

    /// Close − EMA, percent of EMA.
    pub close_vs_ema: Diff,
    /// (AvgDeviationLine − EMA) / EMA × 100.
    pub avg_line_vs_ema_pct: Option<f64>,
    /// (AvgBelowAvgDeviationLine − EMA) / EMA × 100.
    pub lower_line_vs_ema_pct: Option<f64>,
    /// EMA − AvgDeviationLine, percent of EMA.
    pub ema_vs_avg_line: Diff,
    /// AvgBelowAvgDeviationLine − AvgDeviationLine, percent of AvgDeviationLine.
    pub lower_line_vs_avg_line: Diff,

    /// Below the average-deviation line.
    pub avg_line_tier: TierReport,
    /// Below the lower tier line.
    pub lower_line_tier: TierReport,

    /// Institution entry range using the lower tier's full mean.
    pub entry_range_including: EntryRange,
    /// Institution entry range using the lower tier's mean without highlighted episodes.
    pub entry_range_excluding: EntryRange,

    pub passes_screen: bool,
}

impl SymbolReport {
    /// Build the report for an analysis. The series is non-empty by
    /// construction of `Analysis`.
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let series = &analysis.series;
        let bands = &analysis.bands;
        let last = series.len().saturating_sub(1);
        let (latest_date, latest_close) = series
            .latest()
            .map(|p| (p.date, p.close))
            .unwrap_or((NaiveDate::MIN, f64::NAN));

        let ema = bands.ema.get(last);
        let avg = bands.avg_deviation_line.as_ref().and_then(|l| l.get(last));
        let lower = bands
            .avg_below_avg_deviation_line
            .as_ref()
            .and_then(|l| l.get(last));

        let pct_of_ema = |v: Option<f64>| v.zip(ema).map(|(v, e)| (v - e) / e * 100.0);
        let entry_to = |offset: Option<f64>| lower.zip(offset).map(|(l, o)| l + o);

        Self {
            schema_version: SCHEMA_VERSION,
            symbol: series.symbol.clone(),
            source: analysis.source,
            bar_count: series.len(),
            latest_date,
            latest_close,
            latest_ema: ema.unwrap_or(f64::NAN),
            avg_deviation_line: avg,
            avg_below_avg_deviation_line: lower,
            close_vs_ema: Diff::of(Some(latest_close), ema, ema),
            avg_line_vs_ema_pct: pct_of_ema(avg),
            lower_line_vs_ema_pct: pct_of_ema(lower),
            ema_vs_avg_line: Diff::of(ema, avg, ema),
            lower_line_vs_avg_line: Diff::of(lower, avg, avg),
            avg_line_tier: TierReport::from(&analysis.avg_line_tier),
            lower_line_tier: TierReport::from(&analysis.lower_line_tier),
            entry_range_including: EntryRange {
                from: avg,
                to: entry_to(bands.avg_max_deviation_below_avg),
            },
            entry_range_excluding: EntryRange {
                from: avg,
                to: entry_to(analysis.lower_line_tier.mean_excluding_highlighted),
            },
            passes_screen: analysis.passes_screen(),
        }
    }
}
