//! Property-based tests for time-series features and k-means.

use chrono::DateTime;
use proptest::prelude::*;
use sr_common::{EntityId, ScoredReview};
use sr_core::cluster::{fit, step, KMeansParams};
use sr_core::features::{timeline_rows, UserFeatureVector};
use sr_core::pipeline::CancellationToken;
use sr_core::timeline::EntityTimeline;

fn timeline(reviews: &[(f64, u8)]) -> EntityTimeline {
    let entity_id = EntityId::from("prop");
    EntityTimeline {
        entity_id: entity_id.clone(),
        reviews: reviews
            .iter()
            .enumerate()
            .map(|(i, &(sentiment, rating))| ScoredReview {
                entity_id: entity_id.clone(),
                rating,
                sentiment,
                timestamp: DateTime::from_timestamp_millis(1_700_000_000_000 + i as i64 * 1000)
                    .unwrap(),
                helpful_vote: 0,
                verified: false,
            })
            .collect(),
    }
}

fn reviews_strategy() -> impl Strategy<Value = Vec<(f64, u8)>> {
    prop::collection::vec((-1.0f64..=1.0, 1u8..=5), 1..40)
}

fn points_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 3), 4..40)
}

proptest! {
    #[test]
    fn one_row_per_review_with_lags_absent_only_first(reviews in reviews_strategy()) {
        let rows = timeline_rows(&timeline(&reviews), 3);
        prop_assert_eq!(rows.len(), reviews.len());
        for (i, row) in rows.iter().enumerate() {
            prop_assert_eq!(row.review_sequence, i as u64 + 1);
            prop_assert_eq!(row.prev_sentiment.is_none(), i == 0);
            prop_assert_eq!(row.sentiment_change.is_none(), i == 0);
            prop_assert_eq!(row.rating_change.is_none(), i == 0);
        }
    }

    #[test]
    fn cumsum_is_prefix_sum(reviews in reviews_strategy()) {
        let rows = timeline_rows(&timeline(&reviews), 3);
        for (i, row) in rows.iter().enumerate() {
            let expected: f64 = reviews[..=i].iter().map(|r| r.0).sum();
            prop_assert!((row.sentiment_cumsum - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn rolling_window_starts_at_w(reviews in reviews_strategy(), w in 1usize..6) {
        let rows = timeline_rows(&timeline(&reviews), w);
        for (i, row) in rows.iter().enumerate() {
            prop_assert_eq!(row.sentiment_rolling_mean.is_some(), i + 1 >= w);
            prop_assert_eq!(row.sentiment_volatility.is_some(), i + 1 >= w && w >= 2);
        }
        if reviews.len() >= w {
            let expected = reviews[..w].iter().map(|r| r.0).sum::<f64>() / w as f64;
            let got = rows[w - 1].sentiment_rolling_mean.unwrap();
            prop_assert!((got - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn feature_vector_only_for_multi_review_users(reviews in reviews_strategy()) {
        let vector = UserFeatureVector::from_timeline(&timeline(&reviews));
        prop_assert_eq!(vector.is_some(), reviews.len() >= 2);
        if let Some(v) = vector {
            prop_assert_eq!(v.review_count, reviews.len() as u64);
            prop_assert!(v.sentiment_volatility >= 0.0);
        }
    }

    #[test]
    fn kmeans_is_deterministic_per_seed(points in points_strategy(), seed in 0u64..1000) {
        let params = KMeansParams { k: 3, seed, max_iterations: 50, tolerance: 1e-6 };
        let token = CancellationToken::new();
        let a = fit(&points, &params, &token).unwrap();
        let b = fit(&points, &params, &token).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn single_cluster_takes_everything(points in points_strategy()) {
        let params = KMeansParams { k: 1, seed: 42, max_iterations: 50, tolerance: 1e-6 };
        let fitted = fit(&points, &params, &CancellationToken::new()).unwrap();
        prop_assert!(fitted.assignments.iter().all(|&c| c == 0));
        prop_assert!(fitted.converged);
    }

    #[test]
    fn step_never_increases_inertia_on_refit(points in points_strategy()) {
        let params = KMeansParams { k: 2, seed: 7, max_iterations: 100, tolerance: 1e-9 };
        let fitted = fit(&points, &params, &CancellationToken::new()).unwrap();
        let again = step(&fitted.centroids, &points);
        prop_assert!(again.inertia <= fitted.inertia + 1e-6 * fitted.inertia.max(1.0));
    }
}
