//! Named reference lines evaluated on a series' date axis.

use serde::{Deserialize, Serialize};

/// Which derived line a value series represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// The long-horizon EMA.
    Ema,
    /// EMA shifted by the mean extremum of episodes below the EMA.
    AvgDeviation,
    /// AvgDeviation shifted by the mean extremum of episodes below it.
    AvgBelowAvgDeviation,
    /// Unusual-deviation overlay derived from the AvgDeviation tier.
    UnusualAvgDeviation,
    /// Unusual-deviation overlay derived from the AvgBelowAvgDeviation tier.
    UnusualAvgBelowAvgDeviation,
}

impl LineKind {
    pub fn label(&self) -> &'static str {
        match self {
            LineKind::Ema => "EMA 200",
            LineKind::AvgDeviation => "Average Deviation Line",
            LineKind::AvgBelowAvgDeviation => "Avg Max Deviation Below Avg Line",
            LineKind::UnusualAvgDeviation => "Unusual Deviation from Avg Deviation Line",
            LineKind::UnusualAvgBelowAvgDeviation => {
                "Unusual Deviation from Avg Max Deviation Below Avg Line"
            }
        }
    }

    /// Column name used in exported chart data.
    pub fn column(&self) -> &'static str {
        match self {
            LineKind::Ema => "ema200",
            LineKind::AvgDeviation => "avg_deviation_line",
            LineKind::AvgBelowAvgDeviation => "avg_below_avg_deviation_line",
            LineKind::UnusualAvgDeviation => "unusual_avg_deviation_line",
            LineKind::UnusualAvgBelowAvgDeviation => "unusual_avg_below_avg_deviation_line",
        }
    }
}

/// A real-valued line with one value per point of the series it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub kind: LineKind,
    pub values: Vec<f64>,
}

impl ReferenceLine {
    pub fn new(kind: LineKind, values: Vec<f64>) -> Self {
        Self { kind, values }
    }

    /// A new line equal to this one plus a constant offset at every index.
    pub fn shifted(&self, kind: LineKind, offset: f64) -> Self {
        Self {
            kind,
            values: self.values.iter().map(|v| v + offset).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Per-index `close <= line`, the chart's "at or below" marker.
    pub fn at_or_below(&self, closes: &[f64]) -> Vec<bool> {
        closes
            .iter()
            .zip(&self.values)
            .map(|(c, l)| c <= l)
            .collect()
    }

    /// Per-index `(self - base) / base * 100`.
    pub fn percent_vs(&self, base: &ReferenceLine) -> Vec<f64> {
        self.values
            .iter()
            .zip(&base.values)
            .map(|(v, b)| (v - b) / b * 100.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifted_adds_offset() {
        let ema = ReferenceLine::new(LineKind::Ema, vec![100.0, 110.0]);
        let avg = ema.shifted(LineKind::AvgDeviation, -5.0);
        assert_eq!(avg.kind, LineKind::AvgDeviation);
        assert_eq!(avg.values, vec![95.0, 105.0]);
    }

    #[test]
    fn at_or_below_is_inclusive() {
        let line = ReferenceLine::new(LineKind::Ema, vec![10.0, 10.0, 10.0]);
        assert_eq!(line.at_or_below(&[9.0, 10.0, 11.0]), vec![true, true, false]);
    }

    #[test]
    fn percent_vs_base() {
        let ema = ReferenceLine::new(LineKind::Ema, vec![100.0]);
        let avg = ReferenceLine::new(LineKind::AvgDeviation, vec![90.0]);
        assert_eq!(avg.percent_vs(&ema), vec![-10.0]);
    }
}
