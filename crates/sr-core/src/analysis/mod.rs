//! Statistics over accumulated moments and samples.
//!
//! Everything here consumes state built during the single ingest pass
//! (moment sums, the correlation sample, summary counters) and turns it
//! into report-ready results. Statistics that cannot be computed come back
//! as [`Estimate::Undefined`], never as zeros.

pub mod correlation;
pub mod regression;
pub mod sampling;
pub mod segments;
pub mod summary;

pub use correlation::{pearson, spearman_from_sample, CorrelationResult};
pub use regression::{regress, EffectSize, RegressionResult};
pub use sampling::{PairSampler, SampledPairs};
pub use segments::{SegmentAccumulator, SegmentCorrelations};
pub use summary::{
    AnomalyCounts, CategoryShare, DateRange, RatingShare, SentimentSummary, Spread,
    SummaryAccumulator,
};

use sr_common::{Estimate, UndefinedReason};
use sr_math::{Axis, StatError};

/// Variable names used when a statistic is undefined.
#[derive(Debug, Clone, Copy)]
pub struct AxisLabels {
    pub x: &'static str,
    pub y: &'static str,
}

impl AxisLabels {
    pub const SENTIMENT_RATING: AxisLabels = AxisLabels {
        x: "sentiment",
        y: "rating",
    };
    pub const CHANGES: AxisLabels = AxisLabels {
        x: "sentiment_change",
        y: "rating_change",
    };

    fn name(&self, axis: Axis) -> &'static str {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

/// Turn a numerical failure into an explicit undefined estimate.
pub(crate) fn undefined_from<T>(err: &StatError, n: u64, labels: AxisLabels) -> Estimate<T> {
    match err {
        StatError::InsufficientData { n, required } => Estimate::undefined(
            UndefinedReason::InsufficientData,
            format!("n={n}, need at least {required}"),
            *n,
        ),
        StatError::ZeroVariance { axis } => Estimate::undefined(
            UndefinedReason::ZeroVariance,
            format!("{} is constant", labels.name(*axis)),
            n,
        ),
    }
}
