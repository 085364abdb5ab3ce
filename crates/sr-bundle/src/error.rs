//! Error types for bundle operations.

use thiserror::Error;

/// Errors that can occur during bundle operations.
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("checksum mismatch for '{path}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// A file the format requires is absent.
    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("unsupported bundle version: {version} (supported: {supported})")]
    UnsupportedVersion { version: String, supported: String },

    #[error("corrupted manifest: {0}")]
    CorruptedManifest(String),

    /// Requested path is not listed in the manifest.
    #[error("file not found in bundle: {0}")]
    FileNotFound(String),

    #[error("bundle has no content to write")]
    EmptyBundle,

    #[error("duplicate file in bundle: {0}")]
    DuplicateFile(String),
}

/// Result type alias for bundle operations.
pub type Result<T> = std::result::Result<T, BundleError>;
