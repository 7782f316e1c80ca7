//! Batch screener. Runs the per-symbol pipeline over a universe and keeps
//! the symbols that satisfy the screening predicate.
//!
//! Pipelines share nothing but the provider, so they run on a rayon pool and
//! are collected back in universe order. A symbol whose fetch fails or whose
//! series is empty is recorded as `NoData` and never aborts the batch.

use rayon::prelude::*;
use serde::Serialize;

use devband_core::data::DataProvider;

use crate::analysis::{analyze_symbol, AnalysisOptions};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ScreenStatus {
    Passed,
    Rejected,
    NoData(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenOutcome {
    pub symbol: String,
    #[serde(flatten)]
    pub status: ScreenStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScreenSummary {
    /// One outcome per requested symbol, in request order.
    pub outcomes: Vec<ScreenOutcome>,
}

impl ScreenSummary {
    /// Symbols satisfying the predicate, in universe order.
    pub fn passed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.status == ScreenStatus::Passed)
            .map(|o| o.symbol.as_str())
            .collect()
    }

    pub fn no_data(&self) -> Vec<&ScreenOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ScreenStatus::NoData(_)))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// Progress callbacks for a screener run. Called from worker threads.
pub trait ScreenProgress: Send + Sync {
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    fn on_complete(&self, symbol: &str, index: usize, total: usize, status: &ScreenStatus);

    fn on_batch_complete(&self, passed: usize, no_data: usize, total: usize);
}

/// Progress reporter that writes to the `log` facade.
pub struct LogProgress;

impl ScreenProgress for LogProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        log::debug!("[{}/{}] screening {symbol}", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, index: usize, total: usize, status: &ScreenStatus) {
        match status {
            ScreenStatus::NoData(reason) => {
                log::warn!("[{}/{}] {symbol}: {reason}", index + 1, total)
            }
            other => log::info!("[{}/{}] {symbol}: {other:?}", index + 1, total),
        }
    }

    fn on_batch_complete(&self, passed: usize, no_data: usize, total: usize) {
        log::info!("screen complete: {passed}/{total} passed, {no_data} without data");
    }
}

fn screen_one(
    provider: &dyn DataProvider,
    symbol: &str,
    opts: &AnalysisOptions,
) -> ScreenStatus {
    if !provider.is_available() {
        return ScreenStatus::NoData(format!("{} unavailable", provider.name()));
    }
    match analyze_symbol(provider, symbol, opts) {
        Ok(analysis) if analysis.passes_screen() => ScreenStatus::Passed,
        Ok(_) => ScreenStatus::Rejected,
        Err(e) => ScreenStatus::NoData(e.to_string()),
    }
}

/// Screen `symbols`.
///
/// `max_threads` caps a dedicated pool; `None` uses rayon's global pool.
/// With `parallel = false` the symbols are processed in order on the calling
/// thread.
pub fn run_screen(
    provider: &dyn DataProvider,
    symbols: &[&str],
    opts: &AnalysisOptions,
    parallel: bool,
    max_threads: Option<usize>,
    progress: Option<&dyn ScreenProgress>,
) -> ScreenSummary {
    let total = symbols.len();
    let run = |(index, symbol): (usize, &&str)| {
        if let Some(p) = progress {
            p.on_start(symbol, index, total);
        }
        let status = screen_one(provider, symbol, opts);
        if let Some(p) = progress {
            p.on_complete(symbol, index, total, &status);
        }
        ScreenOutcome {
            symbol: symbol.to_string(),
            status,
        }
    };

    let outcomes: Vec<ScreenOutcome> = if !parallel {
        symbols.iter().enumerate().map(run).collect()
    } else {
        let pool = max_threads.and_then(|n| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| log::warn!("screener pool unavailable, using global pool: {e}"))
                .ok()
        });
        match pool {
            Some(pool) => {
                pool.install(|| symbols.par_iter().enumerate().map(run).collect::<Vec<_>>())
            }
            None => symbols.par_iter().enumerate().map(run).collect::<Vec<_>>(),
        }
    };

    let summary = ScreenSummary { outcomes };
    if let Some(p) = progress {
        p.on_batch_complete(summary.passed().len(), summary.no_data().len(), total);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use devband_core::data::StaticProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn opts() -> AnalysisOptions {
        AnalysisOptions {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            ema_span: 3,
            backfill_days: 0,
        }
    }

    /// Two dips below the EMA, then a final close just under the EMA but
    /// above the average-deviation line (span 3: ema ~107.0, line ~102.7).
    const PULLBACK: [f64; 10] = [100.0, 100.0, 90.0, 100.0, 110.0, 100.0, 90.0, 110.0, 115.0, 105.0];

    fn provider() -> StaticProvider {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rising: Vec<f64> = (0..10).map(|i| 100.0 + 5.0 * i as f64).collect();
        StaticProvider::new()
            .with_closes("PULL.NS", first, &PULLBACK)
            .with_closes("RISE.NS", first, &rising)
            .with_failure("DOWN.NS", "connection refused")
    }

    #[derive(Default)]
    struct CountingProgress {
        started: AtomicUsize,
        completed: AtomicUsize,
        batches: AtomicUsize,
    }

    impl ScreenProgress for CountingProgress {
        fn on_start(&self, _: &str, _: usize, _: usize) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }
        fn on_complete(&self, _: &str, _: usize, _: usize, _: &ScreenStatus) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
        fn on_batch_complete(&self, _: usize, _: usize, _: usize) {
            self.batches.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn failing_symbol_does_not_abort_batch() {
        let summary = run_screen(
            &provider(),
            &["PULL.NS", "DOWN.NS"],
            &opts(),
            true,
            None,
            None,
        );
        assert_eq!(summary.passed(), vec!["PULL.NS"]);
        assert_eq!(summary.no_data().len(), 1);
        assert_eq!(summary.no_data()[0].symbol, "DOWN.NS");
    }

    #[test]
    fn outcomes_keep_universe_order() {
        let symbols = ["RISE.NS", "DOWN.NS", "PULL.NS", "MISSING.NS"];
        let summary = run_screen(&provider(), &symbols, &opts(), true, Some(2), None);
        let order: Vec<&str> = summary.outcomes.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(order, symbols);
        assert_eq!(summary.outcomes[0].status, ScreenStatus::Rejected);
        assert_eq!(summary.outcomes[2].status, ScreenStatus::Passed);
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let symbols = ["RISE.NS", "DOWN.NS", "PULL.NS"];
        let seq = run_screen(&provider(), &symbols, &opts(), false, None, None);
        let par = run_screen(&provider(), &symbols, &opts(), true, None, None);
        assert_eq!(seq, par);
    }

    #[test]
    fn progress_sees_every_symbol() {
        let progress = CountingProgress::default();
        let symbols = ["RISE.NS", "DOWN.NS", "PULL.NS"];
        run_screen(&provider(), &symbols, &opts(), true, None, Some(&progress));
        assert_eq!(progress.started.load(Ordering::SeqCst), 3);
        assert_eq!(progress.completed.load(Ordering::SeqCst), 3);
        assert_eq!(progress.batches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_universe_is_empty_summary() {
        let summary = run_screen(&provider(), &[], &opts(), true, None, None);
        assert_eq!(summary.total(), 0);
        assert!(summary.passed().is_empty());
    }
}
