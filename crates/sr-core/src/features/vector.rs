//! Per-user feature vectors for clustering.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sr_common::EntityId;
use sr_math::{ols_line, MomentState};

use crate::timeline::EntityTimeline;

pub const FEATURE_COUNT: usize = 5;

/// Column order of [`UserFeatureVector::as_array`].
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "mean_sentiment",
    "sentiment_volatility",
    "mean_rating",
    "review_count",
    "sentiment_trend",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UserFeatureVector {
    pub entity_id: EntityId,
    pub mean_sentiment: f64,
    /// Sample standard deviation of the user's sentiments.
    pub sentiment_volatility: f64,
    pub mean_rating: f64,
    pub review_count: u64,
    /// OLS slope of sentiment against review sequence 1..L.
    pub sentiment_trend: f64,
}

impl UserFeatureVector {
    /// `None` for timelines with fewer than two reviews.
    pub fn from_timeline(timeline: &EntityTimeline) -> Option<Self> {
        if timeline.len() < 2 {
            return None;
        }

        let mut by_sequence = MomentState::new();
        let mut rating_sum = 0.0;
        for (i, review) in timeline.reviews.iter().enumerate() {
            by_sequence.absorb(i as f64 + 1.0, review.sentiment);
            rating_sum += f64::from(review.rating);
        }

        let trend = ols_line(&by_sequence).ok()?;
        Some(Self {
            entity_id: timeline.entity_id.clone(),
            mean_sentiment: by_sequence.mean_y().ok()?,
            sentiment_volatility: by_sequence.std_y().ok()?,
            mean_rating: rating_sum / timeline.len() as f64,
            review_count: timeline.len() as u64,
            sentiment_trend: trend.slope,
        })
    }

    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.mean_sentiment,
            self.sentiment_volatility,
            self.mean_rating,
            self.review_count as f64,
            self.sentiment_trend,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use sr_common::ScoredReview;

    fn timeline(sentiments: &[f64]) -> EntityTimeline {
        EntityTimeline {
            entity_id: EntityId::from("u"),
            reviews: sentiments
                .iter()
                .enumerate()
                .map(|(i, &sentiment)| ScoredReview {
                    entity_id: EntityId::from("u"),
                    rating: 4,
                    sentiment,
                    timestamp: DateTime::<Utc>::from_timestamp_millis(i as i64).unwrap(),
                    helpful_vote: 0,
                    verified: false,
                })
                .collect(),
        }
    }

    #[test]
    fn single_review_is_ineligible() {
        assert!(UserFeatureVector::from_timeline(&timeline(&[0.3])).is_none());
    }

    #[test]
    fn trend_is_slope_over_sequence() {
        let v = UserFeatureVector::from_timeline(&timeline(&[0.0, 0.1, 0.2, 0.3])).unwrap();
        assert!((v.sentiment_trend - 0.1).abs() < 1e-12);
        assert!((v.mean_sentiment - 0.15).abs() < 1e-12);
        assert_eq!(v.review_count, 4);
        assert_eq!(v.mean_rating, 4.0);
        assert_eq!(v.as_array()[3], 4.0);
    }

    #[test]
    fn constant_sentiment_is_flat() {
        let v = UserFeatureVector::from_timeline(&timeline(&[0.5, 0.5, 0.5])).unwrap();
        assert_eq!(v.sentiment_trend, 0.0);
        assert_eq!(v.sentiment_volatility, 0.0);
    }
}
