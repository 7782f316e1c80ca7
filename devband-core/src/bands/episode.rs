//! Episode extraction: one extremum per contiguous excursion below a line.
//!
//! An episode is a maximal run of indices where `close < line`. The scan
//! starts at index 1: index 0 never opens an episode. Within an episode only
//! the deepest point is kept, and a tie keeps the earlier index because the
//! extremum only moves on a strictly more negative value.
//!
//! A NaN reference value neither opens nor closes an episode.

use chrono::NaiveDate;
use serde::Serialize;

use super::line::{LineKind, ReferenceLine};
use crate::domain::PriceSeries;

/// The deepest point of one excursion below a reference line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Episode {
    /// Index of the extremum in the series.
    pub index: usize,
    pub date: NaiveDate,
    /// `close - line` at the extremum. Always negative.
    pub deviation: f64,
    pub line: LineKind,
}

/// All episodes of one series against one reference line, in date order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSet {
    pub line: LineKind,
    pub episodes: Vec<Episode>,
}

impl EpisodeSet {
    pub fn empty(line: LineKind) -> Self {
        Self {
            line,
            episodes: Vec::new(),
        }
    }

    /// Mean of the extremum deviations. `None` when there are no episodes.
    pub fn mean(&self) -> Option<f64> {
        mean_of(self.episodes.iter().map(|e| e.deviation))
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Episode> {
        self.episodes.iter()
    }

    pub fn deviations(&self) -> Vec<f64> {
        self.episodes.iter().map(|e| e.deviation).collect()
    }
}

/// Arithmetic mean, `None` for an empty input.
pub fn mean_of(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Running state of the scan: the extremum of the currently open episode.
#[derive(Debug, Clone, Copy)]
struct Extremum {
    index: usize,
    deviation: f64,
}

/// Extract the episodes of `series` below `line`.
///
/// `line` must have one value per point of `series`; extra values on either
/// side are ignored.
pub fn extract_episodes(series: &PriceSeries, line: &ReferenceLine) -> EpisodeSet {
    debug_assert_eq!(series.len(), line.len(), "reference line must align with series");

    let points = series.points();
    let (mut extrema, open) = points
        .iter()
        .zip(&line.values)
        .enumerate()
        .skip(1)
        .fold(
            (Vec::new(), None::<Extremum>),
            |(mut closed, open), (index, (point, &level))| {
                let signed = point.close - level;
                if signed < 0.0 {
                    let deeper = match open {
                        Some(current) if signed >= current.deviation => current,
                        _ => Extremum {
                            index,
                            deviation: signed,
                        },
                    };
                    (closed, Some(deeper))
                } else if signed >= 0.0 {
                    closed.extend(open);
                    (closed, None)
                } else {
                    (closed, open)
                }
            },
        );
    extrema.extend(open);

    let episodes = extrema
        .into_iter()
        .map(|e| Episode {
            index: e.index,
            date: points[e.index].date,
            deviation: e.deviation,
            line: line.kind,
        })
        .collect();

    EpisodeSet {
        line: line.kind,
        episodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_series;

    fn constant_line(value: f64, len: usize) -> ReferenceLine {
        ReferenceLine::new(LineKind::Ema, vec![value; len])
    }

    #[test]
    fn worked_example_two_episodes() {
        let closes = [10.0, 10.0, 9.0, 8.0, 9.0, 11.0, 11.0, 10.0, 9.0, 8.0, 7.0, 11.0];
        let series = make_series(&closes);
        let set = extract_episodes(&series, &constant_line(10.0, closes.len()));

        assert_eq!(set.len(), 2);
        assert_eq!(set.episodes[0].index, 3);
        assert_eq!(set.episodes[0].deviation, -2.0);
        assert_eq!(set.episodes[1].index, 10);
        assert_eq!(set.episodes[1].deviation, -3.0);
        assert_eq!(set.mean(), Some(-2.5));
    }

    #[test]
    fn non_negative_series_has_no_episodes() {
        let series = make_series(&[10.0, 11.0, 10.0, 12.0]);
        let set = extract_episodes(&series, &constant_line(10.0, 4));
        assert!(set.is_empty());
        assert_eq!(set.mean(), None);
    }

    #[test]
    fn index_zero_never_opens_an_episode() {
        let series = make_series(&[5.0, 11.0, 12.0]);
        let set = extract_episodes(&series, &constant_line(10.0, 3));
        assert!(set.is_empty());
    }

    #[test]
    fn open_episode_is_flushed_at_end() {
        let series = make_series(&[10.0, 9.0, 7.0, 8.0]);
        let set = extract_episodes(&series, &constant_line(10.0, 4));
        assert_eq!(set.len(), 1);
        assert_eq!(set.episodes[0].index, 2);
        assert_eq!(set.episodes[0].deviation, -3.0);
    }

    #[test]
    fn tie_keeps_first_occurrence() {
        let series = make_series(&[10.0, 8.0, 9.0, 8.0, 10.0]);
        let set = extract_episodes(&series, &constant_line(10.0, 5));
        assert_eq!(set.len(), 1);
        assert_eq!(set.episodes[0].index, 1);
    }

    #[test]
    fn touching_the_line_closes_the_episode() {
        let series = make_series(&[10.0, 9.0, 10.0, 9.5, 10.0]);
        let set = extract_episodes(&series, &constant_line(10.0, 5));
        assert_eq!(set.len(), 2);
        assert_eq!(set.deviations(), vec![-1.0, -0.5]);
    }

    #[test]
    fn nan_line_value_neither_opens_nor_closes() {
        let series = make_series(&[10.0, 9.0, 20.0, 8.0, 11.0]);
        let line = ReferenceLine::new(LineKind::Ema, vec![10.0, 10.0, f64::NAN, 10.0, 10.0]);
        let set = extract_episodes(&series, &line);
        assert_eq!(set.len(), 1);
        assert_eq!(set.episodes[0].index, 3);
    }

    #[test]
    fn empty_series_yields_empty_set() {
        let set = extract_episodes(&PriceSeries::empty("X"), &constant_line(10.0, 0));
        assert!(set.is_empty());
        assert_eq!(set.line, LineKind::Ema);
    }

    #[test]
    fn episode_dates_follow_series() {
        let series = make_series(&[10.0, 9.0, 11.0]);
        let set = extract_episodes(&series, &constant_line(10.0, 3));
        assert_eq!(set.episodes[0].date, series.points()[1].date);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean_of(Vec::<f64>::new()), None);
        assert_eq!(mean_of([1.0, 2.0, 6.0]), Some(3.0));
    }
}
