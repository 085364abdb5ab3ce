//! Configuration snapshots for reproducibility.
//!
//! A snapshot captures the effective configuration at the start of a run
//! and is embedded in the report, so a result can be traced back to the
//! exact parameters and file that produced it.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::analysis::AnalysisConfig;
use crate::preset::PresetName;
use crate::resolve::ConfigPaths;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConfigSnapshot {
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub hostname: Option<String>,

    pub schema_version: String,

    /// Preset the config was layered on.
    pub preset: String,

    /// SHA-256 of the config file content, if one was loaded.
    #[serde(default)]
    pub file_hash: Option<String>,

    #[serde(default)]
    pub file_path: Option<String>,

    pub source: String,

    /// SHA-256 of the effective config serialized as JSON.
    pub effective_hash: String,

    pub effective: AnalysisConfig,
}

impl ConfigSnapshot {
    pub fn new(
        config: &AnalysisConfig,
        paths: &ConfigPaths,
        preset: PresetName,
        file_content: Option<&str>,
    ) -> Self {
        let hostname = hostname::get()
            .ok()
            .map(|h| h.to_string_lossy().to_string());

        // Plain struct with string keys; serialization cannot fail.
        let effective_json = serde_json::to_string(config).unwrap_or_default();

        ConfigSnapshot {
            timestamp: Utc::now(),
            hostname,
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            preset: preset.as_str().to_string(),
            file_hash: file_content.map(hash_content),
            file_path: paths.analysis.as_ref().map(|p| p.display().to_string()),
            source: paths.source.to_string(),
            effective_hash: hash_content(&effective_json),
            effective: config.clone(),
        }
    }

    /// Whether two snapshots describe the same effective parameters.
    pub fn same_parameters(&self, other: &ConfigSnapshot) -> bool {
        self.effective_hash == other.effective_hash
    }
}

/// SHA-256 hex digest of a string.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
