//! Snapshot bundles for analysis runs.
//!
//! A `.srb` bundle packages the outcome of one run so it can be inspected
//! or compared later without re-reading the input.
//!
//! # Bundle Format
//!
//! Bundles are ZIP archives containing:
//! - `manifest.json`: run id, versions, file listing with SHA-256 checksums
//! - `report.json`: the full analysis report
//! - `moments.json`: named moment accumulators of the run
//! - `clusters.json`: cluster state (only when clustering was defined)
//!
//! # Example
//!
//! ```no_run
//! use sr_bundle::{BundleReader, BundleWriter};
//! use std::path::Path;
//!
//! let mut writer = BundleWriter::new("sr-20260115-143022-a7xq");
//! writer.add_report(&serde_json::json!({"total_reviews": 42})).unwrap();
//! writer.write(Path::new("run.srb")).unwrap();
//!
//! let mut reader = BundleReader::open(Path::new("run.srb")).unwrap();
//! let report: serde_json::Value = reader.read_report().unwrap();
//! ```

pub mod error;
pub mod manifest;
pub mod reader;
pub mod writer;

pub use error::{BundleError, Result};
pub use manifest::{BundleManifest, FileEntry, BUNDLE_SCHEMA_VERSION};
pub use reader::BundleReader;
pub use writer::BundleWriter;

/// Well-known file names inside a bundle.
pub mod files {
    pub const MANIFEST: &str = "manifest.json";
    pub const REPORT: &str = "report.json";
    pub const MOMENTS: &str = "moments.json";
    pub const CLUSTERS: &str = "clusters.json";
}
