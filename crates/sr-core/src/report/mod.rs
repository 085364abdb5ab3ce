//! The analysis report.
//!
//! [`AnalysisReport`] is assembled from finished parts only; the builder
//! never computes anything and never fills a missing part with a default.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sr_common::{Error, Estimate, Result, RunId};
use sr_config::ConfigSnapshot;

use crate::analysis::{CorrelationResult, RegressionResult, SegmentCorrelations, SentimentSummary};
use crate::cluster::ClusterAssignment;
use crate::stream::IngestStats;

/// Kinds of non-fatal conditions worth a reader's attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// k-means stopped at the iteration cap.
    ClusteringNotConverged,
    /// A feature was constant across users and left out of clustering.
    FeatureDropped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl ReportWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntityCounts {
    pub entities: u64,
    pub single_review: u64,
    pub multi_review: u64,
    /// Users with enough reviews for a feature vector.
    pub eligible_for_clustering: u64,
}

/// Complete result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    pub schema_version: String,
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
    pub config: ConfigSnapshot,
    pub ingest: IngestStats,
    pub summary: SentimentSummary,
    pub pearson: Estimate<CorrelationResult>,
    pub spearman: Estimate<CorrelationResult>,
    /// Rating on sentiment.
    pub regression: Estimate<RegressionResult>,
    /// Rating change on sentiment change between consecutive reviews.
    pub change_regression: Estimate<RegressionResult>,
    pub segments: SegmentCorrelations,
    pub clustering: Estimate<ClusterAssignment>,
    pub entities: EntityCounts,
    pub warnings: Vec<ReportWarning>,
}

impl AnalysisReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Collects finished parts; `build` fails on the first missing one.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    run_id: Option<RunId>,
    config: Option<ConfigSnapshot>,
    ingest: Option<IngestStats>,
    summary: Option<SentimentSummary>,
    pearson: Option<Estimate<CorrelationResult>>,
    spearman: Option<Estimate<CorrelationResult>>,
    regression: Option<Estimate<RegressionResult>>,
    change_regression: Option<Estimate<RegressionResult>>,
    segments: Option<SegmentCorrelations>,
    clustering: Option<Estimate<ClusterAssignment>>,
    entities: Option<EntityCounts>,
    warnings: Vec<ReportWarning>,
}

fn required<T>(part: Option<T>, component: &str) -> Result<T> {
    part.ok_or_else(|| Error::MissingResult {
        component: component.to_string(),
    })
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    pub fn config(mut self, snapshot: ConfigSnapshot) -> Self {
        self.config = Some(snapshot);
        self
    }

    pub fn ingest(mut self, stats: IngestStats) -> Self {
        self.ingest = Some(stats);
        self
    }

    pub fn summary(mut self, summary: SentimentSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn correlations(
        mut self,
        pearson: Estimate<CorrelationResult>,
        spearman: Estimate<CorrelationResult>,
    ) -> Self {
        self.pearson = Some(pearson);
        self.spearman = Some(spearman);
        self
    }

    pub fn regression(mut self, regression: Estimate<RegressionResult>) -> Self {
        self.regression = Some(regression);
        self
    }

    pub fn change_regression(mut self, regression: Estimate<RegressionResult>) -> Self {
        self.change_regression = Some(regression);
        self
    }

    pub fn segments(mut self, segments: SegmentCorrelations) -> Self {
        self.segments = Some(segments);
        self
    }

    pub fn clustering(mut self, clustering: Estimate<ClusterAssignment>) -> Self {
        self.clustering = Some(clustering);
        self
    }

    pub fn entities(mut self, counts: EntityCounts) -> Self {
        self.entities = Some(counts);
        self
    }

    pub fn warning(mut self, warning: ReportWarning) -> Self {
        self.warnings.push(warning);
        self
    }

    pub fn build(self) -> Result<AnalysisReport> {
        Ok(AnalysisReport {
            schema_version: sr_common::SCHEMA_VERSION.to_string(),
            run_id: required(self.run_id, "run_id")?,
            generated_at: Utc::now(),
            config: required(self.config, "config")?,
            ingest: required(self.ingest, "ingest")?,
            summary: required(self.summary, "summary")?,
            pearson: required(self.pearson, "pearson")?,
            spearman: required(self.spearman, "spearman")?,
            regression: required(self.regression, "regression")?,
            change_regression: required(self.change_regression, "change_regression")?,
            segments: required(self.segments, "segments")?,
            clustering: required(self.clustering, "clustering")?,
            entities: required(self.entities, "entities")?,
            warnings: self.warnings,
        })
    }
}
