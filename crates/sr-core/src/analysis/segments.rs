//! Correlation split by reviewer type.
//!
//! Users with a single review and users with several are accumulated into
//! separate moment states while timelines are scanned.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sr_common::{Estimate, ScoredReview};
use sr_math::MomentState;

use super::correlation::{pearson, CorrelationResult};
use super::AxisLabels;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentAccumulator {
    single: MomentState,
    multi: MomentState,
    single_users: u64,
    multi_users: u64,
}

impl SegmentAccumulator {
    /// Add one entity's reviews.
    pub fn absorb_timeline(&mut self, reviews: &[ScoredReview]) {
        let target = match reviews.len() {
            0 => return,
            1 => {
                self.single_users += 1;
                &mut self.single
            }
            _ => {
                self.multi_users += 1;
                &mut self.multi
            }
        };
        for review in reviews {
            target.absorb(review.sentiment, f64::from(review.rating));
        }
    }

    pub fn single_moments(&self) -> &MomentState {
        &self.single
    }

    pub fn multi_moments(&self) -> &MomentState {
        &self.multi
    }

    pub fn finish(&self, alpha: f64) -> SegmentCorrelations {
        SegmentCorrelations {
            single_review: pearson(&self.single, alpha, AxisLabels::SENTIMENT_RATING),
            multi_review: pearson(&self.multi, alpha, AxisLabels::SENTIMENT_RATING),
            single_review_users: self.single_users,
            multi_review_users: self.multi_users,
            multi_review_records: self.multi.n,
        }
    }
}

/// Sentiment/rating correlation per reviewer segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentCorrelations {
    /// Over users with exactly one review.
    pub single_review: Estimate<CorrelationResult>,
    /// Over every review of users with two or more.
    pub multi_review: Estimate<CorrelationResult>,
    pub single_review_users: u64,
    pub multi_review_users: u64,
    pub multi_review_records: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use sr_common::EntityId;

    fn reviews(entity: &str, pairs: &[(u8, f64)]) -> Vec<ScoredReview> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, &(rating, sentiment))| ScoredReview {
                entity_id: EntityId::from(entity),
                rating,
                sentiment,
                timestamp: DateTime::<Utc>::from_timestamp_millis(i as i64).unwrap(),
                helpful_vote: 0,
                verified: false,
            })
            .collect()
    }

    #[test]
    fn segments_split_by_review_count() {
        let mut acc = SegmentAccumulator::default();
        acc.absorb_timeline(&reviews("a", &[(5, 0.9)]));
        acc.absorb_timeline(&reviews("b", &[(1, -0.8)]));
        acc.absorb_timeline(&reviews("c", &[(3, 0.0)]));
        acc.absorb_timeline(&reviews("d", &[(4, 0.5), (2, -0.1), (5, 0.6)]));
        acc.absorb_timeline(&[]);

        let seg = acc.finish(0.05);
        assert_eq!(seg.single_review_users, 3);
        assert_eq!(seg.multi_review_users, 1);
        assert_eq!(seg.multi_review_records, 3);
        assert!(seg.single_review.defined().unwrap().coefficient > 0.9);
        assert!(seg.multi_review.is_defined());
    }

    #[test]
    fn empty_segment_is_undefined() {
        let mut acc = SegmentAccumulator::default();
        acc.absorb_timeline(&reviews("a", &[(5, 0.9), (4, 0.2)]));
        let seg = acc.finish(0.05);
        assert!(!seg.single_review.is_defined());
        assert_eq!(acc.single_moments().n, 0);
        assert_eq!(acc.multi_moments().n, 2);
    }
}
