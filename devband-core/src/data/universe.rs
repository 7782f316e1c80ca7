//! Sector-organized ticker lists.
//!
//! The universe is stored as a TOML file with a `[sectors]` table mapping a
//! sector name to its exchange-qualified tickers:
//!
//! ```toml
//! [sectors]
//! Banks = ["HDFCBANK.NS", "ICICIBANK.NS"]
//! IT = ["TCS.NS", "INFY.NS"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize universe: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown sector '{0}'")]
    UnknownSector(String),
}

/// The complete universe configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub sectors: BTreeMap<String, Vec<String>>,
}

impl Universe {
    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a universe from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize the universe to TOML.
    pub fn to_toml(&self) -> Result<String, UniverseError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// All tickers across all sectors, in sector order, first occurrence kept.
    pub fn all_tickers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.sectors
            .values()
            .flat_map(|tickers| tickers.iter().map(|t| t.as_str()))
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// Tickers for a specific sector.
    pub fn sector_tickers(&self, sector: &str) -> Result<&[String], UniverseError> {
        self.sectors
            .get(sector)
            .map(|v| v.as_slice())
            .ok_or_else(|| UniverseError::UnknownSector(sector.to_string()))
    }

    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.keys().map(|s| s.as_str()).collect()
    }

    /// Total number of distinct tickers.
    pub fn ticker_count(&self) -> usize {
        self.all_tickers().len()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.sectors.values().any(|v| v.iter().any(|t| t == ticker))
    }

    /// Built-in NSE large-cap universe, grouped by sector.
    pub fn default_nifty() -> Self {
        let mut sectors: BTreeMap<String, Vec<String>> = BTreeMap::new();

        sectors.insert(
            "Banks".into(),
            sector(&[
                "HDFCBANK.NS", "ICICIBANK.NS", "KOTAKBANK.NS", "SBIN.NS", "AXISBANK.NS",
                "INDUSINDBK.NS", "BANKBARODA.NS",
            ]),
        );
        sectors.insert(
            "Financial Services".into(),
            sector(&["BAJFINANCE.NS", "BAJAJFINSV.NS", "HDFCLIFE.NS", "SBILIFE.NS"]),
        );
        sectors.insert(
            "IT".into(),
            sector(&["TCS.NS", "INFY.NS", "HCLTECH.NS", "WIPRO.NS", "TECHM.NS", "LTIM.NS"]),
        );
        sectors.insert(
            "Energy".into(),
            sector(&["RELIANCE.NS", "ONGC.NS", "NTPC.NS", "POWERGRID.NS", "COALINDIA.NS", "BPCL.NS"]),
        );
        sectors.insert(
            "Consumer".into(),
            sector(&[
                "HINDUNILVR.NS", "ITC.NS", "NESTLEIND.NS", "BRITANNIA.NS", "TITAN.NS",
                "ASIANPAINT.NS",
            ]),
        );
        sectors.insert(
            "Auto".into(),
            sector(&["MARUTI.NS", "M&M.NS", "TATAMOTORS.NS", "BAJAJ-AUTO.NS", "EICHERMOT.NS"]),
        );
        sectors.insert(
            "Telecom".into(),
            sector(&["BHARTIARTL.NS"]),
        );
        sectors.insert(
            "Industrials".into(),
            sector(&["LT.NS", "ULTRACEMCO.NS", "GRASIM.NS", "ADANIPORTS.NS"]),
        );
        sectors.insert(
            "Pharma".into(),
            sector(&["SUNPHARMA.NS", "DRREDDY.NS", "CIPLA.NS", "DIVISLAB.NS"]),
        );
        sectors.insert(
            "Metals".into(),
            sector(&["TATASTEEL.NS", "JSWSTEEL.NS", "HINDALCO.NS"]),
        );

        Self { sectors }
    }
}

fn sector(tickers: &[&str]) -> Vec<String> {
    tickers.iter().map(|t| t.to_string()).collect()
}

impl Default for Universe {
    fn default() -> Self {
        Self::default_nifty()
    }
}
