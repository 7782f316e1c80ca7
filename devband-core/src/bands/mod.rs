//! Deviation bands around the long-horizon EMA.
//!
//! Three stages, each a pure function of a `PriceSeries`:
//! - `episode`: one extremum per contiguous run of closes below a reference line
//! - `builder`: repeated episode passes producing the tier lines
//! - `classify`: highlighted/ordinary labels and the screening predicate

pub mod builder;
pub mod classify;
pub mod episode;
pub mod line;

pub use builder::DeviationBands;
pub use classify::{
    check_condition, check_condition_values, classify_tier, Classification, ClassifiedEpisode,
    TierClassification,
};
pub use episode::{extract_episodes, mean_of, Episode, EpisodeSet};
pub use line::{LineKind, ReferenceLine};
