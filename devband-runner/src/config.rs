//! Serializable dashboard configuration.

use chrono::NaiveDate;
use devband_core::data::{Universe, UniverseError, DEFAULT_BACKFILL_DAYS};
use devband_core::indicators::DEFAULT_EMA_SPAN;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analysis::AnalysisOptions;

/// Longest trailing window the backfill may re-fetch.
pub const MAX_BACKFILL_DAYS: i64 = 366;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("universe: {0}")]
    Universe(#[from] UniverseError),
}

/// Everything a dashboard run needs besides the symbol.
///
/// Every field has a default, so an empty TOML file is a valid config:
///
/// ```toml
/// start_date = "2018-01-01"
/// ema_span = 200
/// backfill_days = 5
/// parallel = true
/// universe_file = "universe.toml"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// First date requested from the provider.
    pub start_date: NaiveDate,
    /// Last date requested (inclusive). Defaults to today.
    pub end_date: Option<NaiveDate>,
    pub ema_span: usize,
    /// Trailing calendar days re-fetched when the primary fetch lags.
    pub backfill_days: i64,
    /// Run the screener's per-symbol pipelines on a thread pool.
    pub parallel: bool,
    /// Worker cap for the screener pool. Defaults to rayon's global pool.
    pub max_threads: Option<usize>,
    /// Universe TOML. Defaults to the built-in NSE list.
    pub universe_file: Option<PathBuf>,
    /// Directory of `<SYMBOL>.csv` files used instead of Yahoo Finance.
    pub data_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap_or(NaiveDate::MIN),
            end_date: None,
            ema_span: DEFAULT_EMA_SPAN,
            backfill_days: DEFAULT_BACKFILL_DAYS,
            parallel: true,
            max_threads: None,
            universe_file: None,
            data_dir: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ema_span == 0 {
            return Err(ConfigError::Invalid("ema_span must be >= 1".into()));
        }
        if !(0..=MAX_BACKFILL_DAYS).contains(&self.backfill_days) {
            return Err(ConfigError::Invalid(format!(
                "backfill_days must be within 0..={MAX_BACKFILL_DAYS}"
            )));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ConfigError::Invalid(format!(
                    "end_date {end} is before start_date {}",
                    self.start_date
                )));
            }
        }
        if self.max_threads == Some(0) {
            return Err(ConfigError::Invalid("max_threads must be >= 1".into()));
        }
        Ok(())
    }

    /// Resolve the options for one analysis run, with `today` standing in for
    /// an unset end date.
    pub fn analysis_options(&self, today: NaiveDate) -> AnalysisOptions {
        AnalysisOptions {
            start: self.start_date,
            end: self.end_date.unwrap_or(today),
            ema_span: self.ema_span,
            backfill_days: self.backfill_days,
        }
    }

    /// The configured universe, or the built-in NSE list.
    pub fn load_universe(&self) -> Result<Universe, ConfigError> {
        match &self.universe_file {
            Some(path) => Ok(Universe::from_file(path)?),
            None => Ok(Universe::default_nifty()),
        }
    }
}
