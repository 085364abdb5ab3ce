//! Bundle manifest types and serialization.
//!
//! The manifest is the source of truth for a bundle's contents: run
//! identity, format versions, and every file with its SHA-256 checksum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{BundleError, Result};

/// Current bundle schema version.
pub const BUNDLE_SCHEMA_VERSION: &str = "1.0.0";

/// Bundle manifest containing metadata and file checksums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    /// Bundle format version.
    pub bundle_version: String,

    /// Schema version of the report payload.
    pub schema_version: String,

    pub created_at: DateTime<Utc>,

    /// Run this bundle was produced by.
    pub run_id: String,

    pub files: Vec<FileEntry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tool version that created this bundle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
}

impl BundleManifest {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            bundle_version: BUNDLE_SCHEMA_VERSION.to_string(),
            schema_version: BUNDLE_SCHEMA_VERSION.to_string(),
            created_at: Utc::now(),
            run_id: run_id.into(),
            files: Vec::new(),
            description: None,
            tool_version: None,
        }
    }

    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = version.into();
        self
    }

    pub fn with_tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = Some(version.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn add_file(&mut self, entry: FileEntry) {
        self.files.push(entry);
    }

    /// Total size of all listed files in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn find_file(&self, path: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Validate the manifest structure.
    pub fn validate(&self) -> Result<()> {
        if self.bundle_version != BUNDLE_SCHEMA_VERSION {
            return Err(BundleError::UnsupportedVersion {
                version: self.bundle_version.clone(),
                supported: BUNDLE_SCHEMA_VERSION.to_string(),
            });
        }

        if self.run_id.is_empty() {
            return Err(BundleError::CorruptedManifest("run_id is empty".to_string()));
        }

        let mut seen = std::collections::HashSet::new();
        for file in &self.files {
            if file.path.is_empty() {
                return Err(BundleError::CorruptedManifest(
                    "file entry has empty path".to_string(),
                ));
            }
            if file.sha256.len() != 64 || !file.sha256.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(BundleError::CorruptedManifest(format!(
                    "file '{}' has invalid checksum",
                    file.path
                )));
            }
            if !seen.insert(file.path.as_str()) {
                return Err(BundleError::CorruptedManifest(format!(
                    "file '{}' listed twice",
                    file.path
                )));
            }
        }

        Ok(())
    }

    /// Sort files for deterministic ordering.
    pub fn sort_files(&mut self) {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// File entry in the manifest with checksum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path within the bundle (relative).
    pub path: String,

    /// SHA-256 checksum (64 hex characters).
    pub sha256: String,

    pub bytes: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl FileEntry {
    /// Entry for `data`, checksum computed here.
    pub fn for_data(path: impl Into<String>, data: &[u8]) -> Self {
        Self {
            path: path.into(),
            sha256: Self::compute_checksum(data),
            bytes: data.len() as u64,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Compute SHA-256 checksum of data.
    pub fn compute_checksum(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    pub fn verify(&self, data: &[u8]) -> bool {
        Self::compute_checksum(data) == self.sha256
    }
}
