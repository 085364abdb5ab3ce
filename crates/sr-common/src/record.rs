//! Review records as delivered by the upstream scorer.
//!
//! [`RawReview`] is what arrives on the wire, every field optional.
//! [`RawReview::validate`] either yields a typed [`ScoredReview`] or the
//! single [`SkipReason`] it was rejected for; values are never coerced.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::id::EntityId;

pub const RATING_MIN: u8 = 1;
pub const RATING_MAX: u8 = 5;
pub const SENTIMENT_MIN: f64 = -1.0;
pub const SENTIMENT_MAX: f64 = 1.0;

/// Sentiment strictly below `NEGATIVE_BOUND` is negative, strictly above `POSITIVE_BOUND` positive.
pub const NEGATIVE_BOUND: f64 = -0.1;
pub const POSITIVE_BOUND: f64 = 0.1;

/// One record before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReview {
    #[serde(default, alias = "user_id")]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, alias = "sentiment_score", alias = "compound")]
    pub sentiment: Option<f64>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub helpful_vote: Option<i64>,
    #[serde(default, alias = "verified_purchase")]
    pub verified: Option<bool>,
}

/// Why a record was skipped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Line is not a JSON object of the expected shape.
    Malformed,
    MissingEntityId,
    MissingRating,
    MissingSentiment,
    MissingTimestamp,
    /// Rating is not an integer in 1..=5.
    InvalidRating,
    /// Sentiment is non-finite or outside [-1, 1].
    InvalidSentiment,
    /// Timestamp outside the representable range.
    InvalidTimestamp,
    NegativeHelpfulVote,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Malformed => "malformed",
            SkipReason::MissingEntityId => "missing_entity_id",
            SkipReason::MissingRating => "missing_rating",
            SkipReason::MissingSentiment => "missing_sentiment",
            SkipReason::MissingTimestamp => "missing_timestamp",
            SkipReason::InvalidRating => "invalid_rating",
            SkipReason::InvalidSentiment => "invalid_sentiment",
            SkipReason::InvalidTimestamp => "invalid_timestamp",
            SkipReason::NegativeHelpfulVote => "negative_helpful_vote",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredReview {
    pub entity_id: EntityId,
    pub rating: u8,
    pub sentiment: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub helpful_vote: u64,
    pub verified: bool,
}

impl ScoredReview {
    pub fn category(&self) -> SentimentCategory {
        SentimentCategory::of(self.sentiment)
    }
}

impl RawReview {
    /// Check required fields and declared ranges.
    ///
    /// `helpful_vote` defaults to 0 and `verified` to false when absent.
    pub fn validate(self) -> Result<ScoredReview, SkipReason> {
        let entity_id = match self.entity_id {
            Some(id) if !id.trim().is_empty() => EntityId(id),
            _ => return Err(SkipReason::MissingEntityId),
        };

        let rating = self.rating.ok_or(SkipReason::MissingRating)?;
        if !rating.is_finite()
            || rating.fract() != 0.0
            || rating < f64::from(RATING_MIN)
            || rating > f64::from(RATING_MAX)
        {
            return Err(SkipReason::InvalidRating);
        }

        let sentiment = self.sentiment.ok_or(SkipReason::MissingSentiment)?;
        if !sentiment.is_finite() || !(SENTIMENT_MIN..=SENTIMENT_MAX).contains(&sentiment) {
            return Err(SkipReason::InvalidSentiment);
        }

        let millis = self.timestamp.ok_or(SkipReason::MissingTimestamp)?;
        let timestamp =
            DateTime::<Utc>::from_timestamp_millis(millis).ok_or(SkipReason::InvalidTimestamp)?;

        let helpful_vote = match self.helpful_vote {
            None => 0,
            Some(v) => u64::try_from(v).map_err(|_| SkipReason::NegativeHelpfulVote)?,
        };

        Ok(ScoredReview {
            entity_id,
            rating: rating as u8,
            sentiment,
            timestamp,
            helpful_vote,
            verified: self.verified.unwrap_or(false),
        })
    }
}

/// Coarse sentiment class.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SentimentCategory {
    Negative,
    Neutral,
    Positive,
}

impl SentimentCategory {
    pub const ALL: [SentimentCategory; 3] = [
        SentimentCategory::Negative,
        SentimentCategory::Neutral,
        SentimentCategory::Positive,
    ];

    /// `< -0.1` negative, `> 0.1` positive, neutral in between (bounds inclusive).
    pub fn of(sentiment: f64) -> Self {
        if sentiment < NEGATIVE_BOUND {
            SentimentCategory::Negative
        } else if sentiment > POSITIVE_BOUND {
            SentimentCategory::Positive
        } else {
            SentimentCategory::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentCategory::Negative => "negative",
            SentimentCategory::Neutral => "neutral",
            SentimentCategory::Positive => "positive",
        }
    }
}
