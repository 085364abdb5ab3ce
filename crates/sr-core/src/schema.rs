//! JSON Schema generation for output types.
//!
//! ```bash
//! # List available schema types
//! sr-core schema --list
//!
//! # Schema for one type
//! sr-core schema AnalysisReport
//!
//! # Every schema
//! sr-core schema --all
//! ```

use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::analysis::{
    CorrelationResult, RegressionResult, SegmentCorrelations, SentimentSummary,
};
pub use crate::cluster::{ClusterAssignment, ClusterModel};
pub use crate::features::{TimeSeriesFeatureRow, UserFeatureVector};
pub use crate::report::AnalysisReport;
pub use crate::stream::IngestStats;
pub use sr_common::{RunId, SkipReason};
pub use sr_config::{AnalysisConfig, ConfigSnapshot};

/// Available schema types with their descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        // Report
        ("AnalysisReport", "Complete report of one analysis run"),
        ("RunId", "Analysis run identifier"),
        ("IngestStats", "Record counts and skip reasons"),
        ("SkipReason", "Why a record was rejected"),
        ("SentimentSummary", "Distribution and anomaly summary"),
        ("CorrelationResult", "Correlation coefficient with significance"),
        ("RegressionResult", "OLS line with R² and effect size"),
        ("SegmentCorrelations", "Correlation by single/multi-review users"),
        // Features and clustering
        ("TimeSeriesFeatureRow", "Per-review time-series features"),
        ("UserFeatureVector", "Per-user vector fed to clustering"),
        ("ClusterAssignment", "Clusters, their summaries and members"),
        ("ClusterModel", "Standardization and centroids for assigning users"),
        // Configuration
        ("AnalysisConfig", "Analysis parameters"),
        ("ConfigSnapshot", "Effective configuration recorded in a report"),
    ]
}

/// Generate JSON Schema for a type by name.
///
/// Returns None if the type is unknown.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let schema = match type_name {
        "AnalysisReport" => schema_for!(AnalysisReport),
        "RunId" => schema_for!(RunId),
        "IngestStats" => schema_for!(IngestStats),
        "SkipReason" => schema_for!(SkipReason),
        "SentimentSummary" => schema_for!(SentimentSummary),
        "CorrelationResult" => schema_for!(CorrelationResult),
        "RegressionResult" => schema_for!(RegressionResult),
        "SegmentCorrelations" => schema_for!(SegmentCorrelations),
        "TimeSeriesFeatureRow" => schema_for!(TimeSeriesFeatureRow),
        "UserFeatureVector" => schema_for!(UserFeatureVector),
        "ClusterAssignment" => schema_for!(ClusterAssignment),
        "ClusterModel" => schema_for!(ClusterModel),
        "AnalysisConfig" => schema_for!(AnalysisConfig),
        "ConfigSnapshot" => schema_for!(ConfigSnapshot),
        _ => return None,
    };

    serde_json::to_value(schema).ok()
}

/// Generate all schemas as a map from type name to schema.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    let mut schemas = BTreeMap::new();
    for (name, _desc) in available_schemas() {
        if let Some(schema) = generate_schema(name) {
            schemas.insert(name.to_string(), schema);
        }
    }
    schemas
}
