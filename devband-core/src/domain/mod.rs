//! Domain types for devband

pub mod series;

pub use series::{PricePoint, PriceSeries, SeriesError};

/// Symbol type alias
pub type Symbol = String;
