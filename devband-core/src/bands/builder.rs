//! The three-tier deviation structure around the EMA.
//!
//! Pass 1 measures episodes of the close below the EMA; the mean extremum
//! shifts the EMA down into the average-deviation line. Pass 2 repeats that
//! against the average-deviation line to get the lower tier. Pass 3 measures
//! episodes below the lower tier. Each line is materialised over the whole
//! series before the next pass reads it.
//!
//! An undefined mean (no episodes) leaves every line derived from it `None`.

use serde::Serialize;

use super::classify::{classify_tier, TierClassification};
use super::episode::{extract_episodes, EpisodeSet};
use super::line::{LineKind, ReferenceLine};
use crate::domain::PriceSeries;
use crate::indicators::{deviation, Ema, Indicator};

#[derive(Debug, Clone, Serialize)]
pub struct DeviationBands {
    pub ema_span: usize,
    pub ema: ReferenceLine,
    /// `close - ema` at every index.
    pub deviation: Vec<f64>,

    /// Pass 1: episodes below the EMA.
    pub ema_episodes: EpisodeSet,
    pub avg_deviation: Option<f64>,
    pub avg_deviation_line: Option<ReferenceLine>,

    /// Pass 2: episodes below the average-deviation line. Doubles as the
    /// classified set for that tier.
    pub avg_line_episodes: EpisodeSet,
    pub avg_below_avg_deviation: Option<f64>,
    pub avg_below_avg_deviation_line: Option<ReferenceLine>,

    /// Pass 3: episodes below the lower tier line.
    pub lower_line_episodes: EpisodeSet,

    /// Mean extremum below the average-deviation line.
    pub avg_max_deviation_below_avg_dev: Option<f64>,
    /// Mean extremum below the lower tier line.
    pub avg_max_deviation_below_avg: Option<f64>,

    pub unusual_avg_deviation_line: Option<ReferenceLine>,
    pub unusual_avg_below_avg_deviation_line: Option<ReferenceLine>,

    /// `(lower - avg) / avg * 100` per index.
    pub pct_lower_vs_avg_line: Option<Vec<f64>>,
    /// `(avg - ema) / ema * 100` per index.
    pub pct_avg_line_vs_ema: Option<Vec<f64>>,
}

impl DeviationBands {
    /// Run every pass over `series`. An empty series yields empty lines and
    /// episode sets with all means undefined.
    pub fn build(series: &PriceSeries, ema_span: usize) -> Self {
        let closes = series.closes();
        let ema = ReferenceLine::new(LineKind::Ema, Ema::new(ema_span).compute(series));
        let deviation = deviation(&closes, &ema.values);

        let ema_episodes = extract_episodes(series, &ema);
        let avg_deviation = ema_episodes.mean();
        let avg_deviation_line = avg_deviation.map(|d| ema.shifted(LineKind::AvgDeviation, d));

        let avg_line_episodes = episodes_below(series, avg_deviation_line.as_ref(), LineKind::AvgDeviation);
        let avg_below_avg_deviation = avg_line_episodes.mean();
        let avg_below_avg_deviation_line = avg_deviation_line
            .as_ref()
            .zip(avg_below_avg_deviation)
            .map(|(line, d)| line.shifted(LineKind::AvgBelowAvgDeviation, d));

        let lower_line_episodes = episodes_below(
            series,
            avg_below_avg_deviation_line.as_ref(),
            LineKind::AvgBelowAvgDeviation,
        );

        let avg_max_deviation_below_avg_dev = avg_line_episodes.mean();
        let avg_max_deviation_below_avg = lower_line_episodes.mean();

        let unusual_avg_deviation_line = avg_deviation_line
            .as_ref()
            .zip(avg_max_deviation_below_avg_dev)
            .map(|(line, d)| line.shifted(LineKind::UnusualAvgDeviation, -d));
        let unusual_avg_below_avg_deviation_line = avg_below_avg_deviation_line
            .as_ref()
            .zip(avg_max_deviation_below_avg)
            .map(|(line, d)| line.shifted(LineKind::UnusualAvgBelowAvgDeviation, -d));

        let pct_lower_vs_avg_line = avg_below_avg_deviation_line
            .as_ref()
            .zip(avg_deviation_line.as_ref())
            .map(|(lower, avg)| lower.percent_vs(avg));
        let pct_avg_line_vs_ema = avg_deviation_line.as_ref().map(|avg| avg.percent_vs(&ema));

        log::debug!(
            "{}: {} bars, {} episodes below EMA, {} below avg line, {} below lower line",
            series.symbol,
            series.len(),
            ema_episodes.len(),
            avg_line_episodes.len(),
            lower_line_episodes.len()
        );
        if avg_deviation.is_none() && !series.is_empty() {
            log::warn!("{}: no episodes below EMA, deviation bands undefined", series.symbol);
        }

        Self {
            ema_span,
            ema,
            deviation,
            ema_episodes,
            avg_deviation,
            avg_deviation_line,
            avg_line_episodes,
            avg_below_avg_deviation,
            avg_below_avg_deviation_line,
            lower_line_episodes,
            avg_max_deviation_below_avg_dev,
            avg_max_deviation_below_avg,
            unusual_avg_deviation_line,
            unusual_avg_below_avg_deviation_line,
            pct_lower_vs_avg_line,
            pct_avg_line_vs_ema,
        }
    }

    /// Look up a line by kind. `None` when that line is undefined.
    pub fn line(&self, kind: LineKind) -> Option<&ReferenceLine> {
        match kind {
            LineKind::Ema => Some(&self.ema),
            LineKind::AvgDeviation => self.avg_deviation_line.as_ref(),
            LineKind::AvgBelowAvgDeviation => self.avg_below_avg_deviation_line.as_ref(),
            LineKind::UnusualAvgDeviation => self.unusual_avg_deviation_line.as_ref(),
            LineKind::UnusualAvgBelowAvgDeviation => {
                self.unusual_avg_below_avg_deviation_line.as_ref()
            }
        }
    }

    /// Classified episodes below the average-deviation line.
    pub fn avg_line_tier(&self, series: &PriceSeries) -> TierClassification {
        classify_tier(
            series,
            &self.avg_line_episodes,
            self.avg_deviation_line.as_ref(),
        )
    }

    /// Classified episodes below the lower tier line.
    pub fn lower_line_tier(&self, series: &PriceSeries) -> TierClassification {
        classify_tier(
            series,
            &self.lower_line_episodes,
            self.avg_below_avg_deviation_line.as_ref(),
        )
    }
}

fn episodes_below(series: &PriceSeries, line: Option<&ReferenceLine>, kind: LineKind) -> EpisodeSet {
    line.map(|l| extract_episodes(series, l))
        .unwrap_or_else(|| EpisodeSet::empty(kind))
}
