//! Typed analysis configuration.
//!
//! Every knob the engine reads lives here. A config file may set any
//! subset of fields; missing fields come from the selected preset.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine configuration (`analysis.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub schema_version: String,

    /// Records per batch pulled from the stream.
    pub chunk_size: usize,

    /// Worker threads for moment absorption (1 = sequential).
    pub workers: usize,

    /// Fraction of skipped records that aborts the run.
    pub max_skip_rate: f64,

    /// Records seen before the skip-rate guard starts checking per batch.
    pub min_records_for_skip_check: u64,

    /// Pairs kept for rank correlation.
    pub correlation_buffer_cap: usize,

    /// Seed for the correlation sample.
    pub sampling_seed: u64,

    /// Keep rating-class proportions in the correlation sample.
    pub stratify_by_rating: bool,

    /// Trailing window `w` for rolling features.
    pub rolling_window: usize,

    /// Records per sorted run during entity grouping.
    pub sort_run_size: usize,

    /// Directory for spilled sort runs (system temp dir when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spill_dir: Option<PathBuf>,

    /// Number of clusters `k`.
    pub clusters: usize,

    pub kmeans_seed: u64,
    pub kmeans_max_iterations: usize,

    /// Summed centroid movement below which k-means has converged.
    pub kmeans_tolerance: f64,

    /// p-value threshold for "significant".
    pub significance_alpha: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            chunk_size: 10_000,
            workers: 1,
            max_skip_rate: 0.05,
            min_records_for_skip_check: 1_000,
            correlation_buffer_cap: 50_000,
            sampling_seed: 42,
            stratify_by_rating: true,
            rolling_window: 3,
            sort_run_size: 100_000,
            spill_dir: None,
            clusters: 4,
            kmeans_seed: 42,
            kmeans_max_iterations: 100,
            kmeans_tolerance: 1e-6,
            significance_alpha: 0.001,
        }
    }
}

impl AnalysisConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_max_skip_rate(mut self, rate: f64) -> Self {
        self.max_skip_rate = rate;
        self
    }

    pub fn with_min_records_for_skip_check(mut self, n: u64) -> Self {
        self.min_records_for_skip_check = n;
        self
    }

    pub fn with_correlation_buffer_cap(mut self, cap: usize) -> Self {
        self.correlation_buffer_cap = cap;
        self
    }

    pub fn with_sampling_seed(mut self, seed: u64) -> Self {
        self.sampling_seed = seed;
        self
    }

    pub fn with_stratify_by_rating(mut self, stratify: bool) -> Self {
        self.stratify_by_rating = stratify;
        self
    }

    pub fn with_rolling_window(mut self, w: usize) -> Self {
        self.rolling_window = w;
        self
    }

    pub fn with_sort_run_size(mut self, n: usize) -> Self {
        self.sort_run_size = n;
        self
    }

    pub fn with_spill_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spill_dir = Some(dir.into());
        self
    }

    pub fn with_clusters(mut self, k: usize) -> Self {
        self.clusters = k;
        self
    }

    pub fn with_kmeans_seed(mut self, seed: u64) -> Self {
        self.kmeans_seed = seed;
        self
    }

    pub fn with_kmeans_max_iterations(mut self, n: usize) -> Self {
        self.kmeans_max_iterations = n;
        self
    }

    pub fn with_kmeans_tolerance(mut self, tol: f64) -> Self {
        self.kmeans_tolerance = tol;
        self
    }

    pub fn with_significance_alpha(mut self, alpha: f64) -> Self {
        self.significance_alpha = alpha;
        self
    }

    /// Parse a complete or partial config from JSON, filling gaps from defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
