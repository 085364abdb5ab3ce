//! Bundle writer for creating .srb files.
//!
//! Creates ZIP archives with a manifest and per-file checksums.

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use tracing::{debug, info};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::files;
use crate::{BundleError, BundleManifest, FileEntry, Result};

const JSON_MIME: &str = "application/json";

/// Builder for .srb snapshot bundles.
pub struct BundleWriter {
    manifest: BundleManifest,
    files: Vec<(String, Vec<u8>)>,
}

impl BundleWriter {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            manifest: BundleManifest::new(run_id),
            files: Vec::new(),
        }
    }

    /// Schema version of the report payload.
    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.manifest = self.manifest.with_schema_version(version);
        self
    }

    pub fn with_tool_version(mut self, version: impl Into<String>) -> Self {
        self.manifest = self.manifest.with_tool_version(version);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.manifest = self.manifest.with_description(description);
        self
    }

    /// Add a file to the bundle with automatic checksum.
    pub fn add_file(&mut self, path: impl Into<String>, data: Vec<u8>) -> Result<()> {
        let path = path.into();
        if path == files::MANIFEST || self.manifest.find_file(&path).is_some() {
            return Err(BundleError::DuplicateFile(path));
        }

        let mut entry = FileEntry::for_data(&path, &data);
        if path.ends_with(".json") {
            entry = entry.with_mime_type(JSON_MIME);
        }
        debug!(path = %path, bytes = entry.bytes, "Added file to bundle");

        self.manifest.add_file(entry);
        self.files.push((path, data));
        Ok(())
    }

    /// Add a JSON-serializable value as a file.
    pub fn add_json<T: serde::Serialize>(
        &mut self,
        path: impl Into<String>,
        value: &T,
    ) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.add_file(path, json.into_bytes())
    }

    pub fn add_report<T: serde::Serialize>(&mut self, report: &T) -> Result<()> {
        self.add_json(files::REPORT, report)
    }

    /// Add the run's named moment accumulators.
    pub fn add_moments<T: serde::Serialize>(&mut self, moments: &T) -> Result<()> {
        self.add_json(files::MOMENTS, moments)
    }

    pub fn add_clusters<T: serde::Serialize>(&mut self, clusters: &T) -> Result<()> {
        self.add_json(files::CLUSTERS, clusters)
    }

    /// Current manifest (for inspection before writing).
    pub fn manifest(&self) -> &BundleManifest {
        &self.manifest
    }

    /// Total size in bytes before compression.
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|(_, data)| data.len() as u64).sum()
    }

    /// File count, not including the manifest.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Write the bundle to a file.
    ///
    /// The archive is assembled in memory and written in one call.
    pub fn write(self, path: &Path) -> Result<BundleManifest> {
        let (bytes, manifest) = self.write_to_vec()?;
        std::fs::write(path, &bytes)?;

        info!(
            path = %path.display(),
            files = manifest.file_count(),
            bytes = bytes.len(),
            run_id = %manifest.run_id,
            "Bundle written"
        );

        Ok(manifest)
    }

    /// Write the bundle to a byte vector.
    pub fn write_to_vec(mut self) -> Result<(Vec<u8>, BundleManifest)> {
        if self.files.is_empty() {
            return Err(BundleError::EmptyBundle);
        }

        // Sort files for deterministic ordering
        self.manifest.sort_files();
        self.files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut buffer = Cursor::new(Vec::new());
        write_archive(&mut buffer, &self.manifest, &self.files)?;

        Ok((buffer.into_inner(), self.manifest))
    }
}

fn write_archive<W: Write + Seek>(
    sink: W,
    manifest: &BundleManifest,
    entries: &[(String, Vec<u8>)],
) -> Result<()> {
    let mut zip = ZipWriter::new(sink);
    let options: FileOptions<'_, ()> = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    // Manifest first
    zip.start_file(files::MANIFEST, options)?;
    zip.write_all(manifest.to_json()?.as_bytes())?;

    for (file_path, data) in entries {
        zip.start_file(file_path.as_str(), options)?;
        zip.write_all(data)?;
    }

    zip.finish()?;
    Ok(())
}
