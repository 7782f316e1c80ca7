//! Data providers, backfill reconciliation, and the symbol universe.

pub mod backfill;
pub mod circuit_breaker;
pub mod csv_import;
pub mod provider;
pub mod static_provider;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use backfill::{fetch_with_backfill, merge_backfill, DEFAULT_BACKFILL_DAYS};
pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvProvider;
pub use provider::{DataError, DataProvider, DataSource, FetchResult};
pub use static_provider::StaticProvider;
pub use synthetic::SyntheticProvider;
pub use universe::{Universe, UniverseError};
pub use yahoo::YahooProvider;
