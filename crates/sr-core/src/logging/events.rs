//! Structured event vocabulary.
//!
//! Every pipeline event carries the run id and the stage it was emitted
//! from; event names are stable dotted strings used as the tracing target.

use serde::{Deserialize, Serialize};

/// Processing stages of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Reading, validating and batching records.
    Ingest,
    /// Correlation and regression over accumulated moments.
    Correlate,
    /// Grouping records into per-entity timelines.
    Group,
    /// Time-series and per-user features.
    Features,
    Cluster,
    Report,
    Bundle,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Ingest => "ingest",
            Stage::Correlate => "correlate",
            Stage::Group => "group",
            Stage::Features => "features",
            Stage::Cluster => "cluster",
            Stage::Report => "report",
            Stage::Bundle => "bundle",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";
    pub const RUN_CANCELLED: &str = "run.cancelled";

    // Config
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_INVALID: &str = "config.invalid";

    // Ingest
    pub const INGEST_BATCH: &str = "ingest.batch";
    pub const INGEST_FINISHED: &str = "ingest.finished";
    pub const INGEST_SKIP_RATE_EXCEEDED: &str = "ingest.skip_rate_exceeded";

    // Correlation
    pub const CORRELATION_FINISHED: &str = "correlation.finished";

    // Grouping
    pub const TIMELINE_MERGE_STARTED: &str = "timeline.merge_started";

    // Features
    pub const FEATURES_FINISHED: &str = "features.finished";

    // Clustering
    pub const CLUSTER_DIMENSION_DROPPED: &str = "cluster.dimension_dropped";
    pub const CLUSTER_NOT_CONVERGED: &str = "cluster.not_converged";
    pub const CLUSTER_UNDEFINED: &str = "cluster.undefined";
    pub const CLUSTER_FINISHED: &str = "cluster.finished";

    // Output
    pub const BUNDLE_WRITTEN: &str = "bundle.written";
}

/// Correlation context shared by every event of one run.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_display_matches_serde() {
        for stage in [Stage::Init, Stage::Ingest, Stage::Correlate, Stage::Cluster] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage));
        }
    }

    #[test]
    fn event_names_are_dotted() {
        for name in [
            event_names::RUN_STARTED,
            event_names::CONFIG_INVALID,
            event_names::INGEST_SKIP_RATE_EXCEEDED,
            event_names::CORRELATION_FINISHED,
            event_names::CLUSTER_NOT_CONVERGED,
        ] {
            assert!(name.contains('.'), "{name}");
        }
    }
}
