//! Streamed descriptive summary of sentiment and ratings.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sr_common::record::{NEGATIVE_BOUND, POSITIVE_BOUND};
use sr_common::{Estimate, ScoredReview, SentimentCategory, UndefinedReason};
use sr_math::MomentState;

/// Ratings at or above this with negative sentiment are anomalous.
pub const HIGH_RATING: u8 = 4;
/// Ratings at or below this with positive sentiment are anomalous.
pub const LOW_RATING: u8 = 2;

/// Mergeable counters filled during ingest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryAccumulator {
    count: u64,
    sentiment_min: Option<f64>,
    sentiment_max: Option<f64>,
    categories: [u64; 3],
    ratings: [u64; 5],
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
    high_rating_negative: u64,
    low_rating_positive: u64,
    verified: u64,
}

impl SummaryAccumulator {
    pub fn absorb(&mut self, review: &ScoredReview) {
        self.count += 1;
        let s = review.sentiment;
        self.sentiment_min = Some(self.sentiment_min.map_or(s, |m| m.min(s)));
        self.sentiment_max = Some(self.sentiment_max.map_or(s, |m| m.max(s)));

        self.categories[category_index(review.category())] += 1;
        if let Some(slot) = self.ratings.get_mut(usize::from(review.rating).wrapping_sub(1)) {
            *slot += 1;
        }

        let ts = review.timestamp;
        self.first = Some(self.first.map_or(ts, |f| f.min(ts)));
        self.last = Some(self.last.map_or(ts, |l| l.max(ts)));

        if review.rating >= HIGH_RATING && s < NEGATIVE_BOUND {
            self.high_rating_negative += 1;
        }
        if review.rating <= LOW_RATING && s > POSITIVE_BOUND {
            self.low_rating_positive += 1;
        }
        if review.verified {
            self.verified += 1;
        }
    }

    pub fn merge(&mut self, other: &SummaryAccumulator) {
        self.count += other.count;
        self.sentiment_min = combine(self.sentiment_min, other.sentiment_min, |a, b| a.min(b));
        self.sentiment_max = combine(self.sentiment_max, other.sentiment_max, |a, b| a.max(b));
        for (a, b) in self.categories.iter_mut().zip(other.categories) {
            *a += b;
        }
        for (a, b) in self.ratings.iter_mut().zip(other.ratings) {
            *a += b;
        }
        self.first = combine(self.first, other.first, |a, b| a.min(b));
        self.last = combine(self.last, other.last, |a, b| a.max(b));
        self.high_rating_negative += other.high_rating_negative;
        self.low_rating_positive += other.low_rating_positive;
        self.verified += other.verified;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Build the summary; `moments` must hold (sentiment, rating) for the
    /// same records.
    pub fn finish(&self, moments: &MomentState) -> SentimentSummary {
        let total = self.count;
        let percent = |count: u64| {
            if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            }
        };

        let categories = SentimentCategory::ALL
            .iter()
            .map(|&category| {
                let count = self.categories[category_index(category)];
                CategoryShare {
                    category,
                    count,
                    percent: percent(count),
                }
            })
            .collect();

        let ratings = self
            .ratings
            .iter()
            .zip(1u8..)
            .map(|(&count, rating)| RatingShare {
                rating,
                count,
                percent: percent(count),
            })
            .collect();

        let anomaly_total = self.high_rating_negative + self.low_rating_positive;

        SentimentSummary {
            total_reviews: total,
            verified_reviews: self.verified,
            sentiment: self.sentiment_spread(moments),
            rating: self.rating_spread(moments),
            categories,
            ratings,
            date_range: match (self.first, self.last) {
                (Some(first), Some(last)) => Some(DateRange { first, last }),
                _ => None,
            },
            anomalies: AnomalyCounts {
                high_rating_negative: self.high_rating_negative,
                low_rating_positive: self.low_rating_positive,
                anomaly_rate: percent(anomaly_total) / 100.0,
            },
        }
    }

    fn sentiment_spread(&self, moments: &MomentState) -> Estimate<Spread> {
        match (moments.mean_x(), self.sentiment_min, self.sentiment_max) {
            (Ok(mean), Some(min), Some(max)) => Estimate::Defined(Spread {
                mean,
                std: moments.std_x().ok(),
                min,
                max,
            }),
            _ => empty_spread(),
        }
    }

    fn rating_spread(&self, moments: &MomentState) -> Estimate<Spread> {
        let min = self.ratings.iter().position(|&c| c > 0);
        let max = self.ratings.iter().rposition(|&c| c > 0);
        match (moments.mean_y(), min, max) {
            (Ok(mean), Some(min), Some(max)) => Estimate::Defined(Spread {
                mean,
                std: moments.std_y().ok(),
                min: (min + 1) as f64,
                max: (max + 1) as f64,
            }),
            _ => empty_spread(),
        }
    }
}

fn empty_spread() -> Estimate<Spread> {
    Estimate::undefined(UndefinedReason::InsufficientData, "no accepted records", 0)
}

fn category_index(category: SentimentCategory) -> usize {
    match category {
        SentimentCategory::Negative => 0,
        SentimentCategory::Neutral => 1,
        SentimentCategory::Positive => 2,
    }
}

fn combine<T: Copy>(a: Option<T>, b: Option<T>, pick: impl Fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Location and spread of one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Spread {
    pub mean: f64,
    /// Sample standard deviation; absent for a single record.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryShare {
    pub category: SentimentCategory,
    pub count: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RatingShare {
    pub rating: u8,
    pub count: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    pub first: DateTime<Utc>,
    pub last: DateTime<Utc>,
}

/// Reviews whose text and stars disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnomalyCounts {
    /// Rating ≥ 4 with sentiment < -0.1.
    pub high_rating_negative: u64,
    /// Rating ≤ 2 with sentiment > 0.1.
    pub low_rating_positive: u64,
    /// Both kinds over all reviews, as a fraction.
    pub anomaly_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SentimentSummary {
    pub total_reviews: u64,
    pub verified_reviews: u64,
    pub sentiment: Estimate<Spread>,
    pub rating: Estimate<Spread>,
    pub categories: Vec<CategoryShare>,
    pub ratings: Vec<RatingShare>,
    pub date_range: Option<DateRange>,
    pub anomalies: AnomalyCounts,
}
