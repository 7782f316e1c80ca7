//! Text summary, Markdown, JSON, and chart-data CSV output.
//!
//! Undefined values render as `n/a` in text and Markdown, as `null` in JSON,
//! and as empty cells in CSV.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use devband_core::bands::{EpisodeSet, ReferenceLine};

use crate::analysis::Analysis;
use crate::report::{Diff, SymbolReport, TierReport};
use crate::screener::{ScreenStatus, ScreenSummary};

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => "n/a".to_string(),
    }
}

fn fmt_pct(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v:.2}%"),
        _ => "n/a".to_string(),
    }
}

fn fmt_diff(d: &Diff) -> String {
    format!("{} ({})", fmt_opt(d.absolute), fmt_pct(d.percent))
}

fn fmt_range(from: Option<f64>, to: Option<f64>) -> String {
    format!("{} to {}", fmt_opt(from), fmt_opt(to))
}

// ─── Text summary ───────────────────────────────────────────────────

/// Plain-text summary in the dashboard's line order.
pub fn render_text(r: &SymbolReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} ({} bars, latest {})\n",
        r.symbol, r.bar_count, r.latest_date
    ));
    out.push_str(&format!("Current Price: {:.2}\n", r.latest_close));
    out.push_str(&format!("EMA200: {:.2}\n", r.latest_ema));
    out.push_str(&format!(
        "Average Deviation Line: {}\n",
        fmt_opt(r.avg_deviation_line)
    ));
    out.push_str(&format!(
        "Average Max Deviation Below Avg Line: {}\n",
        fmt_opt(r.avg_below_avg_deviation_line)
    ));
    out.push_str(&format!(
        "Difference between Price and EMA200: {}\n",
        fmt_diff(&r.close_vs_ema)
    ));
    out.push_str(&format!(
        "Average Deviation Line vs EMA200: {}\n",
        fmt_pct(r.avg_line_vs_ema_pct)
    ));
    out.push_str(&format!(
        "Avg Max Deviation Below Avg Line vs EMA200: {}\n",
        fmt_pct(r.lower_line_vs_ema_pct)
    ));
    out.push_str(&format!(
        "Difference between EMA200 and Average Deviation Line: {}\n",
        fmt_diff(&r.ema_vs_avg_line)
    ));
    out.push_str(&format!(
        "Difference between Avg Max Deviation Line and Average Deviation Line: {}\n",
        fmt_diff(&r.lower_line_vs_avg_line)
    ));

    for tier in [&r.avg_line_tier, &r.lower_line_tier] {
        out.push('\n');
        text_tier(&mut out, tier);
    }

    out.push('\n');
    out.push_str(&format!(
        "Institution Entry Range (including highlighted): {}\n",
        fmt_range(r.entry_range_including.from, r.entry_range_including.to)
    ));
    out.push_str(&format!(
        "Institution Entry Range (excluding highlighted): {}\n",
        fmt_range(r.entry_range_excluding.from, r.entry_range_excluding.to)
    ));
    out.push_str(&format!(
        "Screen: {}\n",
        if r.passes_screen { "PASS" } else { "no" }
    ));
    out
}

fn text_tier(out: &mut String, tier: &TierReport) {
    out.push_str(&format!("Below {}:\n", tier.line.label()));
    out.push_str(&format!(
        "  mean extremum: {} (excluding highlighted: {})\n",
        fmt_opt(tier.mean),
        fmt_opt(tier.mean_excluding_highlighted)
    ));
    if tier.episodes.is_empty() {
        out.push_str("  no episodes\n");
        return;
    }
    for e in &tier.episodes {
        out.push_str(&format!(
            "  {}{} close {:.2} deviation {:.2} ({:.2}%)\n",
            if e.is_highlighted() { "* " } else { "  " },
            e.date,
            e.close,
            e.deviation,
            e.percent
        ));
    }
}

// ─── Markdown ───────────────────────────────────────────────────────

/// Markdown report with a summary table and one episode table per tier.
pub fn render_markdown(r: &SymbolReport) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {} deviation bands\n\n", r.symbol));

    md.push_str("## Summary\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Latest Date | {} |\n", r.latest_date));
    md.push_str(&format!("| Bars | {} |\n", r.bar_count));
    md.push_str(&format!("| Source | {:?} |\n", r.source));
    md.push_str(&format!("| Close | {:.2} |\n", r.latest_close));
    md.push_str(&format!("| EMA | {:.2} |\n", r.latest_ema));
    md.push_str(&format!(
        "| Average Deviation Line | {} |\n",
        fmt_opt(r.avg_deviation_line)
    ));
    md.push_str(&format!(
        "| Avg Max Deviation Below Avg Line | {} |\n",
        fmt_opt(r.avg_below_avg_deviation_line)
    ));
    md.push_str(&format!("| Close − EMA | {} |\n", fmt_diff(&r.close_vs_ema)));
    md.push_str(&format!(
        "| Avg Line vs EMA | {} |\n",
        fmt_pct(r.avg_line_vs_ema_pct)
    ));
    md.push_str(&format!(
        "| Lower Line vs EMA | {} |\n",
        fmt_pct(r.lower_line_vs_ema_pct)
    ));
    md.push_str(&format!("| EMA − Avg Line | {} |\n", fmt_diff(&r.ema_vs_avg_line)));
    md.push_str(&format!(
        "| Lower Line − Avg Line | {} |\n",
        fmt_diff(&r.lower_line_vs_avg_line)
    ));
    md.push_str(&format!(
        "| Entry Range (incl. highlighted) | {} |\n",
        fmt_range(r.entry_range_including.from, r.entry_range_including.to)
    ));
    md.push_str(&format!(
        "| Entry Range (excl. highlighted) | {} |\n",
        fmt_range(r.entry_range_excluding.from, r.entry_range_excluding.to)
    ));
    md.push_str(&format!(
        "| Screen | {} |\n\n",
        if r.passes_screen { "**PASS**" } else { "no" }
    ));

    for tier in [&r.avg_line_tier, &r.lower_line_tier] {
        markdown_tier(&mut md, tier);
    }
    md
}

fn markdown_tier(md: &mut String, tier: &TierReport) {
    md.push_str(&format!("## Below {}\n\n", tier.line.label()));
    md.push_str(&format!(
        "Mean extremum {} (excluding highlighted {}).\n\n",
        fmt_opt(tier.mean),
        fmt_opt(tier.mean_excluding_highlighted)
    ));
    if tier.episodes.is_empty() {
        md.push_str("_No episodes._\n\n");
        return;
    }
    md.push_str("| Date | Close | Deviation | % | Highlighted |\n");
    md.push_str("| --- | --- | --- | --- | --- |\n");
    for e in &tier.episodes {
        md.push_str(&format!(
            "| {} | {:.2} | {:.2} | {:.2}% | {} |\n",
            e.date,
            e.close,
            e.deviation,
            e.percent,
            if e.is_highlighted() { "yes" } else { "" }
        ));
    }
    md.push('\n');
}

/// Markdown list of a screener run.
pub fn render_screen(summary: &ScreenSummary) -> String {
    let passed = summary.passed();
    let mut md = String::new();
    md.push_str(&format!(
        "# Screen: {} of {} symbols\n\n",
        passed.len(),
        summary.total()
    ));
    if passed.is_empty() {
        md.push_str("_No symbols satisfy the condition._\n");
    } else {
        for symbol in &passed {
            md.push_str(&format!("- {symbol}\n"));
        }
    }

    let missing = summary.no_data();
    if !missing.is_empty() {
        md.push_str("\n## No data\n\n");
        for o in missing {
            if let ScreenStatus::NoData(reason) = &o.status {
                md.push_str(&format!("- {}: {}\n", o.symbol, reason));
            }
        }
    }
    md
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(report: &SymbolReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize SymbolReport to JSON")
}

// ─── Chart CSV ──────────────────────────────────────────────────────

fn cell(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v:.6}"),
        _ => String::new(),
    }
}

fn line_cell(line: Option<&ReferenceLine>, i: usize) -> String {
    cell(line.and_then(|l| l.get(i)))
}

fn flag(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        ""
    }
}

fn extremum_indices(set: &EpisodeSet) -> HashSet<usize> {
    set.iter().map(|e| e.index).collect()
}

/// Per-date chart data: lines, percent diagnostics, and marker columns.
///
/// Columns: date, close, ema200, deviation, avg_deviation_line,
/// avg_below_avg_deviation_line, unusual_avg_deviation_line,
/// unusual_avg_below_avg_deviation_line, pct_lower_vs_avg_line,
/// pct_avg_line_vs_ema, below_ema, below_avg_line, below_lower_line,
/// extremum_ema, extremum_avg_line, extremum_lower_line
pub fn export_chart_csv(analysis: &Analysis) -> Result<String> {
    let series = &analysis.series;
    let bands = &analysis.bands;
    let closes = series.closes();

    let avg = bands.avg_deviation_line.as_ref();
    let lower = bands.avg_below_avg_deviation_line.as_ref();
    let unusual_avg = bands.unusual_avg_deviation_line.as_ref();
    let unusual_lower = bands.unusual_avg_below_avg_deviation_line.as_ref();

    let below_ema = bands.ema.at_or_below(&closes);
    let below_avg = avg.map(|l| l.at_or_below(&closes));
    let below_lower = lower.map(|l| l.at_or_below(&closes));

    let ext_ema = extremum_indices(&bands.ema_episodes);
    let ext_avg = extremum_indices(&bands.avg_line_episodes);
    let ext_lower = extremum_indices(&bands.lower_line_episodes);

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "close",
        bands.ema.kind.column(),
        "deviation",
        "avg_deviation_line",
        "avg_below_avg_deviation_line",
        "unusual_avg_deviation_line",
        "unusual_avg_below_avg_deviation_line",
        "pct_lower_vs_avg_line",
        "pct_avg_line_vs_ema",
        "below_ema",
        "below_avg_line",
        "below_lower_line",
        "extremum_ema",
        "extremum_avg_line",
        "extremum_lower_line",
    ])?;

    let marker = |m: &Option<Vec<bool>>, i: usize| {
        flag(m.as_ref().and_then(|v| v.get(i).copied()).unwrap_or(false))
    };

    for (i, p) in series.points().iter().enumerate() {
        wtr.write_record([
            p.date.to_string().as_str(),
            &format!("{:.6}", p.close),
            &line_cell(Some(&bands.ema), i),
            &cell(bands.deviation.get(i).copied()),
            &line_cell(avg, i),
            &line_cell(lower, i),
            &line_cell(unusual_avg, i),
            &line_cell(unusual_lower, i),
            &cell(bands.pct_lower_vs_avg_line.as_ref().and_then(|v| v.get(i).copied())),
            &cell(bands.pct_avg_line_vs_ema.as_ref().and_then(|v| v.get(i).copied())),
            flag(below_ema.get(i).copied().unwrap_or(false)),
            marker(&below_avg, i),
            marker(&below_lower, i),
            flag(ext_ema.contains(&i)),
            flag(ext_avg.contains(&i)),
            flag(ext_lower.contains(&i)),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write chart data CSV to `path`.
pub fn write_chart_csv(analysis: &Analysis, path: &Path) -> Result<()> {
    let csv = export_chart_csv(analysis)?;
    std::fs::write(path, csv)
        .with_context(|| format!("failed to write chart data to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use devband_core::data::DataSource;
    use devband_core::domain::{PricePoint, PriceSeries};

    use crate::screener::ScreenOutcome;

    fn analysis(closes: &[f64], span: usize) -> Analysis {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = closes
            .iter()
            .zip(first.iter_days())
            .map(|(&c, d)| PricePoint::new(d, c))
            .collect();
        let series = PriceSeries::new("INFY.NS", points).unwrap();
        Analysis::from_series(series, DataSource::Fixture, span).unwrap()
    }

    fn swings(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + i as f64 * 0.05 + 10.0 * (i as f64 / 7.0).sin())
            .collect()
    }

    #[test]
    fn text_shows_na_for_undefined_lines() {
        let rising: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        let text = render_text(&analysis(&rising, 200).report());
        assert!(text.contains("Average Deviation Line: n/a"));
        assert!(text.contains("no episodes"));
        assert!(text.contains("Screen: no"));
    }

    #[test]
    fn text_layout_is_newline_terminated() {
        let rising: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        let text = render_text(&analysis(&rising, 200).report());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 22);
        assert_eq!(lines[0], "INFY.NS (20 bars, latest 2024-01-20)");
        assert_eq!(lines[1], "Current Price: 29.00");
        assert_eq!(lines[10], "");
        assert_eq!(lines[11], "Below Average Deviation Line:");
        assert_eq!(lines[12], "  mean extremum: n/a (excluding highlighted: n/a)");
        assert_eq!(lines[13], "  no episodes");
        assert_eq!(lines[15], "Below Avg Max Deviation Below Avg Line:");
        assert_eq!(lines[18], "");
        assert!(text.ends_with("Screen: no\n"));
    }

    #[test]
    fn text_lists_episodes_and_marks_highlighted() {
        let a = analysis(&swings(300), 30);
        let text = render_text(&a.report());
        assert!(text.contains("INFY.NS (300 bars"));
        assert!(text.contains("Below Average Deviation Line:"));
        let starred = text.lines().filter(|l| l.starts_with("  * ")).count();
        assert_eq!(
            starred,
            a.avg_line_tier.highlighted_count() + a.lower_line_tier.highlighted_count()
        );
    }

    #[test]
    fn markdown_has_tier_sections() {
        let md = render_markdown(&analysis(&swings(300), 30).report());
        assert!(md.starts_with("# INFY.NS deviation bands"));
        assert!(md.contains("## Below Average Deviation Line"));
        assert!(md.contains("## Below Avg Max Deviation Below Avg Line"));
        assert!(md.contains("| Date | Close | Deviation | % | Highlighted |"));
    }

    #[test]
    fn json_uses_null_for_undefined() {
        let rising: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        let json = export_json(&analysis(&rising, 200).report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["avg_deviation_line"].is_null());
        assert_eq!(value["symbol"], "INFY.NS");
        assert_eq!(value["schema_version"], 1);
    }

    #[test]
    fn chart_csv_has_one_row_per_bar() {
        let a = analysis(&swings(120), 30);
        let csv = export_chart_csv(&a).unwrap();
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(&headers[2], "ema200");
        assert_eq!(headers.len(), 16);

        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 120);
        assert_eq!(&rows[0][0], "2024-01-01");

        let ema_extrema = rows.iter().filter(|r| &r[13] == "1").count();
        assert_eq!(ema_extrema, a.bands.ema_episodes.len());
        for row in rows.iter().filter(|r| &r[13] == "1") {
            assert_eq!(&row[10], "1");
        }
    }

    #[test]
    fn chart_csv_leaves_undefined_lines_empty() {
        let rising: Vec<f64> = (0..5).map(|i| 10.0 + i as f64).collect();
        let csv = export_chart_csv(&analysis(&rising, 200)).unwrap();
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        for row in rdr.records() {
            let row = row.unwrap();
            assert_eq!(&row[4], "");
            assert_eq!(&row[11], "");
        }
    }

    #[test]
    fn write_chart_csv_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.csv");
        write_chart_csv(&analysis(&swings(40), 10), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 41);
    }

    #[test]
    fn screen_rendering_lists_passed_and_missing() {
        let summary = ScreenSummary {
            outcomes: vec![
                ScreenOutcome {
                    symbol: "A.NS".into(),
                    status: ScreenStatus::Passed,
                },
                ScreenOutcome {
                    symbol: "B.NS".into(),
                    status: ScreenStatus::Rejected,
                },
                ScreenOutcome {
                    symbol: "C.NS".into(),
                    status: ScreenStatus::NoData("no data found for C.NS".into()),
                },
            ],
        };
        let md = render_screen(&summary);
        assert!(md.starts_with("# Screen: 1 of 3 symbols"));
        assert!(md.contains("- A.NS\n"));
        assert!(!md.contains("- B.NS"));
        assert!(md.contains("- C.NS: no data found for C.NS"));
    }
}
