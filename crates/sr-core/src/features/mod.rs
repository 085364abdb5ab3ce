//! Per-entity time-series features.
//!
//! [`rows`] turns one timeline into causal per-review rows; [`vector`]
//! condenses a timeline into the fixed-length vector used for clustering.

pub mod rows;
pub mod vector;

pub use rows::{timeline_rows, TimeSeriesFeatureRow};
pub use vector::{UserFeatureVector, FEATURE_COUNT, FEATURE_NAMES};
