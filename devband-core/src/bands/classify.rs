//! Episode classification and the screening predicate.
//!
//! Within a tier, an episode is `Highlighted` when its extremum compares
//! below the tier mean with the plain signed comparison `deviation < mean`.

use chrono::NaiveDate;
use serde::Serialize;

use super::builder::DeviationBands;
use super::episode::{mean_of, Episode, EpisodeSet};
use super::line::{LineKind, ReferenceLine};
use crate::domain::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Highlighted,
    NotHighlighted,
}

/// An episode extremum with the values a report needs to show it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassifiedEpisode {
    pub date: NaiveDate,
    pub index: usize,
    pub deviation: f64,
    pub close: f64,
    /// Value of the reference line at the extremum.
    pub line_value: f64,
    /// `deviation / line_value * 100`.
    pub percent: f64,
    pub classification: Classification,
}

impl ClassifiedEpisode {
    pub fn is_highlighted(&self) -> bool {
        self.classification == Classification::Highlighted
    }
}

/// Classified episodes of one tier line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierClassification {
    pub line: LineKind,
    /// Mean extremum over all episodes ("including highlighted").
    pub mean: Option<f64>,
    /// Mean extremum over the not-highlighted episodes only.
    pub mean_excluding_highlighted: Option<f64>,
    pub episodes: Vec<ClassifiedEpisode>,
}

impl TierClassification {
    pub fn highlighted(&self) -> impl Iterator<Item = &ClassifiedEpisode> {
        self.episodes.iter().filter(|e| e.is_highlighted())
    }

    pub fn highlighted_count(&self) -> usize {
        self.highlighted().count()
    }
}

/// Label every episode in `set` against the set's own mean.
///
/// `line` is the reference the set was measured against; when it is `None`
/// the tier is undefined and the result is empty.
pub fn classify_tier(
    series: &PriceSeries,
    set: &EpisodeSet,
    line: Option<&ReferenceLine>,
) -> TierClassification {
    let mean = set.mean();
    let episodes: Vec<ClassifiedEpisode> = match (line, mean) {
        (Some(line), Some(mean)) => set
            .iter()
            .filter_map(|e| classify_one(series, line, e, mean))
            .collect(),
        _ => Vec::new(),
    };

    let mean_excluding_highlighted = mean_of(
        episodes
            .iter()
            .filter(|e| !e.is_highlighted())
            .map(|e| e.deviation),
    );

    TierClassification {
        line: set.line,
        mean,
        mean_excluding_highlighted,
        episodes,
    }
}

fn classify_one(
    series: &PriceSeries,
    line: &ReferenceLine,
    episode: &Episode,
    mean: f64,
) -> Option<ClassifiedEpisode> {
    let point = series.get(episode.index)?;
    let line_value = line.get(episode.index)?;
    let classification = if episode.deviation < mean {
        Classification::Highlighted
    } else {
        Classification::NotHighlighted
    };
    Some(ClassifiedEpisode {
        date: episode.date,
        index: episode.index,
        deviation: episode.deviation,
        close: point.close,
        line_value,
        percent: episode.deviation / line_value * 100.0,
        classification,
    })
}

/// Screening predicate on the latest point: the close has pulled back below
/// the EMA but is still above the average-deviation line.
pub fn check_condition(series: &PriceSeries, bands: &DeviationBands) -> bool {
    let Some(latest) = series.latest() else {
        return false;
    };
    let Some(ema) = bands.ema.latest() else {
        return false;
    };
    let avg_line = bands.avg_deviation_line.as_ref().and_then(|l| l.latest());
    check_condition_values(latest.close, ema, avg_line)
}

/// `close < ema && close > avg_line`. An undefined line never passes.
pub fn check_condition_values(close: f64, ema: f64, avg_line: Option<f64>) -> bool {
    match avg_line {
        Some(avg) => close < ema && close > avg,
        None => false,
    }
}
