//! End-to-end analysis run.
//!
//! One pass over the stream feeds the moment accumulators, the summary,
//! the correlation sampler and the external sorter. Timelines then come
//! out of the sorter one entity at a time for feature extraction, and the
//! per-user vectors are clustered. Nothing but the vectors of multi-review
//! users is held for the whole run.

pub mod cancel;

pub use cancel::CancellationToken;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use sr_common::{Error, Result, RunId, ScoredReview};
use sr_config::{validate_analysis, AnalysisConfig, ConfigPaths, ConfigSnapshot, PresetName};
use sr_math::MomentState;

use crate::analysis::{
    pearson, regress, spearman_from_sample, AxisLabels, PairSampler, SegmentAccumulator,
    SummaryAccumulator,
};
use crate::cluster::{cluster_users, ClusterModel, KMeansParams};
use crate::features::{timeline_rows, UserFeatureVector};
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use crate::report::{AnalysisReport, EntityCounts, ReportBuilder, ReportWarning, WarningKind};
use crate::stream::{ReviewSource, ReviewStream, SkipGuard};
use crate::timeline::ExternalSorter;

/// Names of the moment states kept in a bundle.
pub mod moment_names {
    pub const SENTIMENT_RATING: &str = "sentiment_rating";
    pub const CHANGES: &str = "changes";
    pub const SINGLE_REVIEW: &str = "single_review";
    pub const MULTI_REVIEW: &str = "multi_review";
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub report: AnalysisReport,
    /// Named accumulators, for the bundle's moment cache.
    pub moments: BTreeMap<String, MomentState>,
    pub cluster_model: Option<ClusterModel>,
}

/// Drives one analysis over a review source.
pub struct Analyzer {
    config: AnalysisConfig,
    snapshot: ConfigSnapshot,
    run_id: RunId,
    cancel: CancellationToken,
    rows_path: Option<PathBuf>,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig, snapshot: ConfigSnapshot) -> Self {
        Self {
            config,
            snapshot,
            run_id: RunId::new(),
            cancel: CancellationToken::new(),
            rows_path: None,
        }
    }

    /// Analyzer on a config that did not come from a file.
    pub fn from_config(config: AnalysisConfig) -> Self {
        let snapshot = ConfigSnapshot::new(
            &config,
            &ConfigPaths::default(),
            PresetName::default(),
            None,
        );
        Self::new(config, snapshot)
    }

    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Also write every time-series feature row as JSON Lines to `path`.
    pub fn with_rows_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.rows_path = Some(path.into());
        self
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&self, source: &dyn ReviewSource) -> Result<AnalysisRun> {
        let ctx = LogContext::new(self.run_id.as_str());
        self.run_stages(&ctx, source).inspect_err(|e| {
            if let Error::Cancelled { stage } = e {
                log_event!(
                    ctx,
                    WARN,
                    event_names::RUN_CANCELLED,
                    stage,
                    "Analysis cancelled"
                );
            }
        })
    }

    fn run_stages(&self, ctx: &LogContext, source: &dyn ReviewSource) -> Result<AnalysisRun> {
        let config = &self.config;
        validate_analysis(config).map_err(|e| {
            let err = Error::from(e);
            log_event!(
                ctx,
                ERROR,
                event_names::CONFIG_INVALID,
                Stage::Init,
                err.to_string()
            );
            err
        })?;
        log_event!(
            ctx,
            INFO,
            event_names::RUN_STARTED,
            Stage::Init,
            "Starting analysis",
            source = source.describe().as_str(),
            chunk_size = config.chunk_size as u64,
            workers = config.workers as u64
        );

        // Ingest: one pass feeding every accumulator.
        let guard = SkipGuard::from_config(config);
        let mut stream = ReviewStream::open(source, config.chunk_size)?;
        let mut moments = MomentState::new();
        let mut summary = SummaryAccumulator::default();
        let mut sampler = PairSampler::from_config(config);
        let mut sorter = ExternalSorter::from_config(config);

        while let Some(batch) = stream.next() {
            self.cancel.check(Stage::Ingest)?;
            let batch = batch?;

            let partial = absorb_batch(&batch.records, config.workers)?;
            moments.merge(&partial.moments);
            summary.merge(&partial.summary);

            let accepted = batch.records.len() as u64;
            for (offset, review) in batch.records.into_iter().enumerate() {
                sampler.offer(review.sentiment, f64::from(review.rating), review.rating);
                sorter.push(batch.start_sequence + offset as u64, review)?;
            }

            let stats = stream.stats();
            log_event!(
                ctx,
                DEBUG,
                event_names::INGEST_BATCH,
                Stage::Ingest,
                "Batch absorbed",
                batch = stats.batches,
                accepted = accepted,
                seen = stats.seen,
                skipped = stats.skipped
            );
            self.guard_skips(ctx, &guard, stats, false)?;
        }

        let ingest = stream.into_stats();
        self.guard_skips(ctx, &guard, &ingest, true)?;
        log_event!(
            ctx,
            INFO,
            event_names::INGEST_FINISHED,
            Stage::Ingest,
            "Ingest finished",
            seen = ingest.seen,
            accepted = ingest.accepted,
            skipped = ingest.skipped,
            batches = ingest.batches,
            spilled_runs = sorter.spilled_runs() as u64
        );

        // Correlation and regression over the streamed moments.
        let alpha = config.significance_alpha;
        let sample = sampler.finish();
        let pearson_r = pearson(&moments, alpha, AxisLabels::SENTIMENT_RATING);
        let spearman_r = spearman_from_sample(
            &sample.pairs,
            sample.population,
            alpha,
            AxisLabels::SENTIMENT_RATING,
        );
        let regression = regress(&moments, alpha, AxisLabels::SENTIMENT_RATING);
        log_event!(
            ctx,
            INFO,
            event_names::CORRELATION_FINISHED,
            Stage::Correlate,
            "Correlations computed",
            pairs = moments.n,
            sampled = sample.pairs.len() as u64,
            pearson_defined = pearson_r.is_defined()
        );
        let sentiment_summary = summary.finish(&moments);

        // Timelines, one entity at a time.
        if sorter.spilled_runs() > 0 {
            log_event!(
                ctx,
                INFO,
                event_names::TIMELINE_MERGE_STARTED,
                Stage::Group,
                "Merging sorted runs",
                runs = sorter.spilled_runs() as u64
            );
        }
        let timelines = sorter.finish()?;
        let mut rows_out = match &self.rows_path {
            Some(path) => Some(BufWriter::new(File::create(path)?)),
            None => None,
        };

        let mut change_moments = MomentState::new();
        let mut segments = SegmentAccumulator::default();
        let mut vectors = Vec::new();
        let mut entity_count = 0u64;
        let mut rows_written = 0u64;

        for timeline in timelines {
            self.cancel.check(Stage::Features)?;
            let timeline = timeline?;
            entity_count += 1;
            segments.absorb_timeline(&timeline.reviews);

            for row in timeline_rows(&timeline, config.rolling_window) {
                if let (Some(dx), Some(dy)) = (row.sentiment_change, row.rating_change) {
                    change_moments.absorb(dx, dy);
                }
                if let Some(out) = rows_out.as_mut() {
                    serde_json::to_writer(&mut *out, &row)?;
                    out.write_all(b"\n")?;
                    rows_written += 1;
                }
            }

            if let Some(vector) = UserFeatureVector::from_timeline(&timeline) {
                vectors.push(vector);
            }
        }
        if let Some(mut out) = rows_out {
            out.flush()?;
        }

        let segment_correlations = segments.finish(alpha);
        let change_regression = regress(&change_moments, alpha, AxisLabels::CHANGES);
        log_event!(
            ctx,
            INFO,
            event_names::FEATURES_FINISHED,
            Stage::Features,
            "Features computed",
            entities = entity_count,
            eligible = vectors.len() as u64,
            change_pairs = change_moments.n,
            rows_written = rows_written
        );

        // Clustering.
        let clustering = cluster_users(
            &vectors,
            &KMeansParams::from_config(config),
            ctx,
            &self.cancel,
        )?;

        let mut builder = ReportBuilder::new()
            .run_id(self.run_id.clone())
            .config(self.snapshot.clone())
            .ingest(ingest)
            .summary(sentiment_summary)
            .correlations(pearson_r, spearman_r)
            .regression(regression)
            .change_regression(change_regression)
            .segments(segment_correlations.clone())
            .entities(EntityCounts {
                entities: entity_count,
                single_review: segment_correlations.single_review_users,
                multi_review: segment_correlations.multi_review_users,
                eligible_for_clustering: vectors.len() as u64,
            });

        if let Some(assignment) = clustering.assignment.defined() {
            if !assignment.converged {
                builder = builder.warning(ReportWarning::new(
                    WarningKind::ClusteringNotConverged,
                    format!(
                        "k-means stopped after {} iterations without converging",
                        assignment.iterations
                    ),
                ));
            }
            for feature in &assignment.dropped_features {
                builder = builder.warning(ReportWarning::new(
                    WarningKind::FeatureDropped,
                    format!("{feature} is constant across users and was not clustered on"),
                ));
            }
        }

        let report = builder.clustering(clustering.assignment).build()?;
        log_event!(
            ctx,
            INFO,
            event_names::RUN_FINISHED,
            Stage::Report,
            "Analysis finished",
            warnings = report.warnings.len() as u64
        );

        let mut named = BTreeMap::new();
        named.insert(moment_names::SENTIMENT_RATING.to_string(), moments);
        named.insert(moment_names::CHANGES.to_string(), change_moments);
        named.insert(
            moment_names::SINGLE_REVIEW.to_string(),
            *segments.single_moments(),
        );
        named.insert(
            moment_names::MULTI_REVIEW.to_string(),
            *segments.multi_moments(),
        );

        Ok(AnalysisRun {
            report,
            moments: named,
            cluster_model: clustering.model,
        })
    }

    fn guard_skips(
        &self,
        ctx: &LogContext,
        guard: &SkipGuard,
        stats: &crate::stream::IngestStats,
        at_end: bool,
    ) -> Result<()> {
        guard.check(stats, at_end).inspect_err(|e| {
            log_event!(
                ctx,
                ERROR,
                event_names::INGEST_SKIP_RATE_EXCEEDED,
                Stage::Ingest,
                e.to_string(),
                seen = stats.seen,
                skipped = stats.skipped
            );
        })
    }
}

/// Per-batch contribution of one worker.
#[derive(Debug, Default)]
struct BatchPartial {
    moments: MomentState,
    summary: SummaryAccumulator,
}

impl BatchPartial {
    fn absorb(records: &[ScoredReview]) -> Self {
        let mut partial = BatchPartial::default();
        for review in records {
            partial
                .moments
                .absorb(review.sentiment, f64::from(review.rating));
            partial.summary.absorb(review);
        }
        partial
    }

    fn merge(mut self, other: &BatchPartial) -> Self {
        self.moments.merge(&other.moments);
        self.summary.merge(&other.summary);
        self
    }
}

/// Split a batch into disjoint slices absorbed on scoped threads, then
/// merge the partial states in slice order.
fn absorb_batch(records: &[ScoredReview], workers: usize) -> Result<BatchPartial> {
    if workers <= 1 || records.len() < 2 * workers {
        return Ok(BatchPartial::absorb(records));
    }

    let slice_len = records.len().div_ceil(workers);
    std::thread::scope(|scope| {
        let handles: Vec<_> = records
            .chunks(slice_len)
            .map(|slice| scope.spawn(move || BatchPartial::absorb(slice)))
            .collect();

        handles
            .into_iter()
            .try_fold(BatchPartial::default(), |acc, handle| -> Result<BatchPartial> {
                let partial = handle
                    .join()
                    .map_err(|_| Error::Internal("moment worker panicked".to_string()))?;
                Ok(acc.merge(&partial))
            })
    })
}
