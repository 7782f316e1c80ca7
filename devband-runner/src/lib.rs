//! devband runner — per-symbol analysis, screening, and report rendering.
//!
//! This crate builds on `devband-core` to provide:
//! - Dashboard configuration (TOML)
//! - The per-symbol pipeline: fetch with backfill, bands, classification
//! - The summary report model
//! - The batch screener over a universe
//! - Text, Markdown, JSON, and chart-data CSV export

pub mod analysis;
pub mod config;
pub mod export;
pub mod report;
pub mod screener;

pub use analysis::{analyze_symbol, Analysis, AnalysisError, AnalysisOptions};
pub use config::{ConfigError, DashboardConfig};
pub use export::{
    export_chart_csv, export_json, render_markdown, render_screen, render_text, write_chart_csv,
};
pub use report::{Diff, EntryRange, SymbolReport, TierReport, SCHEMA_VERSION};
pub use screener::{
    run_screen, LogProgress, ScreenOutcome, ScreenProgress, ScreenStatus, ScreenSummary,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn analysis_is_send_sync() {
        assert_send::<Analysis>();
        assert_sync::<Analysis>();
    }

    #[test]
    fn report_is_send_sync() {
        assert_send::<SymbolReport>();
        assert_sync::<SymbolReport>();
    }

    #[test]
    fn screen_types_are_send_sync() {
        assert_send::<ScreenOutcome>();
        assert_sync::<ScreenOutcome>();
        assert_send::<ScreenSummary>();
        assert_sync::<ScreenSummary>();
        assert_send::<AnalysisOptions>();
        assert_sync::<AnalysisOptions>();
    }

    #[test]
    fn config_is_send_sync() {
        assert_send::<DashboardConfig>();
        assert_sync::<DashboardConfig>();
    }
}
