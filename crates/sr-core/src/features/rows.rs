//! Lag, change, cumulative and rolling features.
//!
//! Every field of row `i` depends only on reviews `1..=i` of the same
//! entity.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sr_common::EntityId;

use crate::timeline::EntityTimeline;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimeSeriesFeatureRow {
    pub entity_id: EntityId,
    /// 1-based position in the entity's timeline.
    pub review_sequence: u64,
    pub sentiment: f64,
    pub rating: u8,
    pub prev_sentiment: Option<f64>,
    pub prev_rating: Option<u8>,
    pub sentiment_change: Option<f64>,
    pub rating_change: Option<f64>,
    pub sentiment_cumsum: f64,
    /// Mean of the trailing `w` sentiments; absent while fewer than `w`.
    pub sentiment_rolling_mean: Option<f64>,
    /// Sample standard deviation of the trailing `w` sentiments; absent
    /// while fewer than `w`, and always for `w < 2`.
    pub sentiment_volatility: Option<f64>,
}

/// One forward pass over a timeline.
///
/// A `window` of zero yields no rolling values at all.
pub fn timeline_rows(timeline: &EntityTimeline, window: usize) -> Vec<TimeSeriesFeatureRow> {
    let sentiments: Vec<f64> = timeline.sentiments().collect();
    let mut rows = Vec::with_capacity(timeline.len());
    let mut cumsum = 0.0;

    for (i, review) in timeline.reviews.iter().enumerate() {
        cumsum += review.sentiment;
        let prev = i.checked_sub(1).map(|p| &timeline.reviews[p]);

        let trailing = (window > 0 && i + 1 >= window).then(|| &sentiments[i + 1 - window..=i]);
        let rolling_mean = trailing.map(mean);
        let volatility = trailing.and_then(sample_std);

        rows.push(TimeSeriesFeatureRow {
            entity_id: timeline.entity_id.clone(),
            review_sequence: i as u64 + 1,
            sentiment: review.sentiment,
            rating: review.rating,
            prev_sentiment: prev.map(|p| p.sentiment),
            prev_rating: prev.map(|p| p.rating),
            sentiment_change: prev.map(|p| review.sentiment - p.sentiment),
            rating_change: prev.map(|p| f64::from(review.rating) - f64::from(p.rating)),
            sentiment_cumsum: cumsum,
            sentiment_rolling_mean: rolling_mean,
            sentiment_volatility: volatility,
        });
    }
    rows
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}
