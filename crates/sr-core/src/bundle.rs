//! Snapshot bundles of analysis runs.
//!
//! Glue between [`AnalysisRun`] and the `sr-bundle` archive format.

use std::collections::BTreeMap;
use std::path::Path;

use sr_bundle::{BundleError, BundleManifest, BundleReader, BundleWriter};
use sr_common::{Error, Result, SCHEMA_VERSION};
use sr_math::MomentState;

use crate::cluster::ClusterModel;
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use crate::pipeline::AnalysisRun;
use crate::report::AnalysisReport;

/// Contents of a bundle after verification.
#[derive(Debug, Clone)]
pub struct BundleContents {
    pub manifest: BundleManifest,
    pub report: AnalysisReport,
    pub moments: Option<BTreeMap<String, MomentState>>,
    pub clusters: Option<ClusterModel>,
    /// Files whose checksum did not match the manifest.
    pub failed_checksums: Vec<String>,
}

fn bundle_error(e: BundleError) -> Error {
    Error::Bundle(e.to_string())
}

fn writer_for(run: &AnalysisRun) -> Result<BundleWriter> {
    let report = &run.report;
    let mut writer = BundleWriter::new(report.run_id.as_str())
        .with_schema_version(SCHEMA_VERSION)
        .with_tool_version(env!("CARGO_PKG_VERSION"))
        .with_description(format!(
            "{} reviews, {} users",
            report.ingest.accepted, report.entities.entities
        ));
    writer.add_report(report).map_err(bundle_error)?;
    writer.add_moments(&run.moments).map_err(bundle_error)?;
    if let Some(model) = &run.cluster_model {
        writer.add_clusters(model).map_err(bundle_error)?;
    }
    Ok(writer)
}

/// Write `run` as a `.srb` bundle at `path`.
pub fn write_bundle(run: &AnalysisRun, path: &Path) -> Result<BundleManifest> {
    let manifest = writer_for(run)?.write(path).map_err(bundle_error)?;
    let ctx = LogContext::new(&manifest.run_id);
    log_event!(
        ctx,
        INFO,
        event_names::BUNDLE_WRITTEN,
        Stage::Bundle,
        "Bundle written",
        path = path.display().to_string().as_str(),
        files = manifest.file_count() as u64,
        bytes = manifest.total_bytes()
    );
    Ok(manifest)
}

/// Bundle bytes for `run`, without touching the filesystem.
pub fn bundle_bytes(run: &AnalysisRun) -> Result<Vec<u8>> {
    let (bytes, _) = writer_for(run)?.write_to_vec().map_err(bundle_error)?;
    Ok(bytes)
}

/// Open and verify a bundle file.
pub fn read_bundle(path: &Path) -> Result<BundleContents> {
    let reader = BundleReader::open(path).map_err(bundle_error)?;
    read_contents(reader)
}

pub fn read_bundle_bytes(bytes: Vec<u8>) -> Result<BundleContents> {
    let reader = BundleReader::from_bytes(bytes).map_err(bundle_error)?;
    read_contents(reader)
}

fn read_contents<R: std::io::Read + std::io::Seek>(
    mut reader: BundleReader<R>,
) -> Result<BundleContents> {
    let failed_checksums = reader.verify_all();
    let report = reader.read_report().map_err(bundle_error)?;
    let moments = reader.read_moments().map_err(bundle_error)?;
    let clusters = reader.read_clusters().map_err(bundle_error)?;
    Ok(BundleContents {
        manifest: reader.manifest().clone(),
        report,
        moments,
        clusters,
        failed_checksums,
    })
}
