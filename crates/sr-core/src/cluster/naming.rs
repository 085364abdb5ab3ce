//! Human-readable cluster names.
//!
//! A name combines the members' sentiment tone, how active they are
//! relative to all clustered users, and the direction of their trend,
//! e.g. "Critical frequent reviewers (declining)".

/// Mean review count above this multiple of the population mean is "frequent".
pub const FREQUENT_FACTOR: f64 = 1.5;
/// Absolute per-review sentiment slope treated as a trend.
pub const TREND_THRESHOLD: f64 = 0.02;

pub fn cluster_name(
    mean_sentiment: f64,
    mean_review_count: f64,
    population_review_count: f64,
    sentiment_trend: f64,
) -> String {
    let tone = if mean_sentiment > 0.1 {
        "Positive"
    } else if mean_sentiment < -0.1 {
        "Critical"
    } else {
        "Neutral"
    };
    let activity = if mean_review_count > FREQUENT_FACTOR * population_review_count {
        "frequent"
    } else {
        "occasional"
    };
    let trend = if sentiment_trend > TREND_THRESHOLD {
        "improving"
    } else if sentiment_trend < -TREND_THRESHOLD {
        "declining"
    } else {
        "steady"
    };
    format!("{tone} {activity} reviewers ({trend})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_combine_three_traits() {
        assert_eq!(
            cluster_name(0.4, 2.0, 3.0, 0.05),
            "Positive occasional reviewers (improving)"
        );
        assert_eq!(
            cluster_name(-0.3, 10.0, 3.0, -0.1),
            "Critical frequent reviewers (declining)"
        );
        assert_eq!(
            cluster_name(0.1, 4.5, 3.0, 0.0),
            "Neutral occasional reviewers (steady)"
        );
    }
}
