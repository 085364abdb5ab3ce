//! Bundle reader for opening and verifying .srb files.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::files;
use crate::{BundleError, BundleManifest, FileEntry, Result};

/// Reader for .srb bundles with checksum verification.
pub struct BundleReader<R: Read + Seek> {
    manifest: BundleManifest,
    archive: ZipArchive<R>,
    verified: HashSet<String>,
}

impl BundleReader<File> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl BundleReader<Cursor<Vec<u8>>> {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> BundleReader<R> {
    /// Create a reader from any Read + Seek source.
    ///
    /// The manifest is parsed and validated up front; file contents are
    /// verified as they are read.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let manifest = Self::read_manifest(&mut archive)?;
        manifest.validate()?;

        info!(
            run_id = %manifest.run_id,
            files = manifest.file_count(),
            "Bundle opened"
        );

        Ok(Self {
            manifest,
            archive,
            verified: HashSet::new(),
        })
    }

    fn read_manifest(archive: &mut ZipArchive<R>) -> Result<BundleManifest> {
        let mut manifest_file = archive
            .by_name(files::MANIFEST)
            .map_err(|_| BundleError::MissingFile(files::MANIFEST.to_string()))?;

        let mut json = String::new();
        manifest_file.read_to_string(&mut json)?;
        BundleManifest::from_json(&json)
            .map_err(|e| BundleError::CorruptedManifest(e.to_string()))
    }

    pub fn manifest(&self) -> &BundleManifest {
        &self.manifest
    }

    pub fn run_id(&self) -> &str {
        &self.manifest.run_id
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.manifest.files
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.manifest.find_file(path).is_some()
    }

    /// Read a file without verification.
    ///
    /// Use `read_verified` for integrity-checked reads.
    pub fn read_raw(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|_| BundleError::FileNotFound(path.to_string()))?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        debug!(path, bytes = data.len(), "Read file from bundle (unverified)");
        Ok(data)
    }

    /// Read a file with checksum verification against the manifest.
    pub fn read_verified(&mut self, path: &str) -> Result<Vec<u8>> {
        let expected = self
            .manifest
            .find_file(path)
            .ok_or_else(|| BundleError::FileNotFound(path.to_string()))?
            .sha256
            .clone();

        let data = self.read_raw(path)?;
        let actual = FileEntry::compute_checksum(&data);
        if actual != expected {
            return Err(BundleError::ChecksumMismatch {
                path: path.to_string(),
                expected,
                actual,
            });
        }

        self.verified.insert(path.to_string());
        debug!(path, "File verified");
        Ok(data)
    }

    pub fn is_verified(&self, path: &str) -> bool {
        self.verified.contains(path)
    }

    /// Verify every listed file. Returns the paths that failed.
    pub fn verify_all(&mut self) -> Vec<String> {
        let paths: Vec<String> = self.manifest.files.iter().map(|f| f.path.clone()).collect();
        let mut failures = Vec::new();

        for path in paths {
            if let Err(e) = self.read_verified(&path) {
                warn!(path = %path, error = %e, "Verification failed");
                failures.push(path);
            }
        }

        if failures.is_empty() {
            info!("All files verified");
        }
        failures
    }

    /// Read and parse a verified JSON file.
    pub fn read_json<T: DeserializeOwned>(&mut self, path: &str) -> Result<T> {
        let data = self.read_verified(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn read_report<T: DeserializeOwned>(&mut self) -> Result<T> {
        if !self.has_file(files::REPORT) {
            return Err(BundleError::MissingFile(files::REPORT.to_string()));
        }
        self.read_json(files::REPORT)
    }

    pub fn read_moments<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        self.read_optional(files::MOMENTS)
    }

    /// Cluster state, absent when clustering was undefined for the run.
    pub fn read_clusters<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        self.read_optional(files::CLUSTERS)
    }

    fn read_optional<T: DeserializeOwned>(&mut self, path: &str) -> Result<Option<T>> {
        if self.has_file(path) {
            Ok(Some(self.read_json(path)?))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BundleWriter;
    use std::io::Write;
    use zip::write::{FileOptions, ZipWriter};

    fn sample_bundle() -> Vec<u8> {
        let mut writer = BundleWriter::new("sr-20260115-143022-a7xq");
        writer
            .add_report(&serde_json::json!({"total_reviews": 3}))
            .unwrap();
        writer.write_to_vec().unwrap().0
    }

    #[test]
    fn reads_report_and_reports_absent_optional_files() {
        let mut reader = BundleReader::from_bytes(sample_bundle()).unwrap();
        assert_eq!(reader.run_id(), "sr-20260115-143022-a7xq");
        let report: serde_json::Value = reader.read_report().unwrap();
        assert_eq!(report["total_reviews"], 3);
        assert!(reader.is_verified(files::REPORT));
        let clusters: Option<serde_json::Value> = reader.read_clusters().unwrap();
        assert!(clusters.is_none());
    }

    #[test]
    fn unlisted_file_is_not_found() {
        let mut reader = BundleReader::from_bytes(sample_bundle()).unwrap();
        assert!(matches!(
            reader.read_verified("other.json"),
            Err(BundleError::FileNotFound(_))
        ));
    }

    #[test]
    fn missing_manifest_is_reported() {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buffer);
            let options: FileOptions<'_, ()> = FileOptions::default();
            zip.start_file("report.json", options).unwrap();
            zip.write_all(b"{}").unwrap();
            zip.finish().unwrap();
        }
        assert!(matches!(
            BundleReader::from_bytes(buffer.into_inner()),
            Err(BundleError::MissingFile(_))
        ));
    }

    #[test]
    fn tampered_content_fails_verification() {
        let mut manifest = BundleManifest::new("run");
        manifest.add_file(FileEntry::for_data(files::REPORT, b"{\"a\":1}"));

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buffer);
            let options: FileOptions<'_, ()> = FileOptions::default();
            zip.start_file(files::MANIFEST, options).unwrap();
            zip.write_all(manifest.to_json().unwrap().as_bytes()).unwrap();
            zip.start_file(files::REPORT, options).unwrap();
            zip.write_all(b"{\"a\":2}").unwrap();
            zip.finish().unwrap();
        }

        let mut reader = BundleReader::from_bytes(buffer.into_inner()).unwrap();
        assert_eq!(reader.verify_all(), vec![files::REPORT.to_string()]);
        assert!(matches!(
            reader.read_report::<serde_json::Value>(),
            Err(BundleError::ChecksumMismatch { .. })
        ));
    }
}
