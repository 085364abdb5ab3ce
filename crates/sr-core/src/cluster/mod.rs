//! K-means segmentation of users.
//!
//! Users with at least two reviews are standardized on their feature
//! vectors, constant dimensions are dropped, and k-means groups the rest.
//! Too few users or no usable dimension makes the result undefined.

pub mod kmeans;
pub mod naming;
pub mod standardize;

pub use kmeans::{fit, init_plus_plus, nearest, step, KMeansFit, KMeansParams, StepOutcome};
pub use naming::cluster_name;
pub use standardize::Standardizer;

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sr_common::{EntityId, Estimate, Result, UndefinedReason};

use crate::features::{UserFeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use crate::pipeline::CancellationToken;

// Positions in `FEATURE_NAMES`.
const MEAN_SENTIMENT: usize = 0;
const REVIEW_COUNT: usize = 3;
const SENTIMENT_TREND: usize = 4;

/// Descriptive statistics of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClusterSummary {
    pub index: usize,
    pub name: String,
    pub member_count: u64,
    /// Fraction of eligible users in this cluster.
    pub share: f64,
    /// Centroid in z-scores, per used feature.
    pub centroid_standardized: BTreeMap<String, f64>,
    /// Centroid in original units, per used feature.
    pub centroid: BTreeMap<String, f64>,
    /// Member means of every feature, dropped ones included.
    pub means: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntityCluster {
    pub entity_id: EntityId,
    pub cluster: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClusterAssignment {
    pub k: usize,
    pub used_features: Vec<String>,
    /// Features with zero variance across users.
    pub dropped_features: Vec<String>,
    pub clusters: Vec<ClusterSummary>,
    /// One entry per eligible user, in entity order.
    pub assignments: Vec<EntityCluster>,
    pub iterations: usize,
    pub converged: bool,
    pub inertia: f64,
    pub eligible_entities: u64,
}

/// State needed to assign new users to the fitted clusters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClusterModel {
    pub features: Vec<String>,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
    /// Standardized centroids over `features`.
    pub centroids: Vec<Vec<f64>>,
}

pub struct ClusteringOutcome {
    pub assignment: Estimate<ClusterAssignment>,
    pub model: Option<ClusterModel>,
}

impl ClusteringOutcome {
    fn undefined(reason: UndefinedReason, detail: String, n: u64) -> Self {
        Self {
            assignment: Estimate::undefined(reason, detail, n),
            model: None,
        }
    }
}

/// Cluster eligible users.
///
/// `vectors` should already be in entity order; assignments keep it.
pub fn cluster_users(
    vectors: &[UserFeatureVector],
    params: &KMeansParams,
    ctx: &LogContext,
    cancel: &CancellationToken,
) -> Result<ClusteringOutcome> {
    let eligible = vectors.len() as u64;
    if params.k == 0 || vectors.len() < params.k {
        log_event!(
            ctx,
            WARN,
            event_names::CLUSTER_UNDEFINED,
            Stage::Cluster,
            "Too few eligible users for clustering",
            eligible = eligible,
            k = params.k as u64
        );
        return Ok(ClusteringOutcome::undefined(
            UndefinedReason::TooFewEntities,
            format!("{eligible} eligible users, k={}", params.k),
            eligible,
        ));
    }

    let raw: Vec<Vec<f64>> = vectors.iter().map(|v| v.as_array().to_vec()).collect();
    let scaler = Standardizer::fit(&raw, FEATURE_COUNT);
    for &d in &scaler.dropped {
        log_event!(
            ctx,
            WARN,
            event_names::CLUSTER_DIMENSION_DROPPED,
            Stage::Cluster,
            "Zero-variance feature dropped",
            feature = FEATURE_NAMES[d]
        );
    }
    if !scaler.usable() {
        log_event!(
            ctx,
            WARN,
            event_names::CLUSTER_UNDEFINED,
            Stage::Cluster,
            "No usable feature left after standardization",
            eligible = eligible
        );
        return Ok(ClusteringOutcome::undefined(
            UndefinedReason::NoUsableDimensions,
            "every feature is constant across users".to_string(),
            eligible,
        ));
    }

    let points: Vec<Vec<f64>> = raw.iter().map(|p| scaler.transform(p)).collect();
    let fitted = fit(&points, params, cancel)?;
    if !fitted.converged {
        log_event!(
            ctx,
            WARN,
            event_names::CLUSTER_NOT_CONVERGED,
            Stage::Cluster,
            "k-means hit the iteration cap before converging",
            iterations = fitted.iterations as u64
        );
    }

    let used: Vec<String> = scaler.kept.iter().map(|&d| FEATURE_NAMES[d].to_string()).collect();
    let dropped: Vec<String> = scaler
        .dropped
        .iter()
        .map(|&d| FEATURE_NAMES[d].to_string())
        .collect();

    let clusters = summarize(&fitted, &raw, &scaler, &used, eligible);

    log_event!(
        ctx,
        INFO,
        event_names::CLUSTER_FINISHED,
        Stage::Cluster,
        "Clustering finished",
        k = params.k as u64,
        iterations = fitted.iterations as u64,
        converged = fitted.converged,
        inertia = fitted.inertia
    );

    let model = ClusterModel {
        features: used.clone(),
        means: scaler.kept.iter().map(|&d| scaler.means[d]).collect(),
        stds: scaler.kept.iter().map(|&d| scaler.stds[d]).collect(),
        centroids: fitted.centroids.clone(),
    };

    let assignments = vectors
        .iter()
        .zip(&fitted.assignments)
        .map(|(v, &cluster)| EntityCluster {
            entity_id: v.entity_id.clone(),
            cluster,
        })
        .collect();

    Ok(ClusteringOutcome {
        assignment: Estimate::Defined(ClusterAssignment {
            k: params.k,
            used_features: used,
            dropped_features: dropped,
            clusters,
            assignments,
            iterations: fitted.iterations,
            converged: fitted.converged,
            inertia: fitted.inertia,
            eligible_entities: eligible,
        }),
        model: Some(model),
    })
}

fn summarize(
    fitted: &KMeansFit,
    raw: &[Vec<f64>],
    scaler: &Standardizer,
    used: &[String],
    eligible: u64,
) -> Vec<ClusterSummary> {
    let k = fitted.centroids.len();
    let mut sums = vec![[0.0; FEATURE_COUNT]; k];
    let mut counts = vec![0u64; k];
    for (point, &c) in raw.iter().zip(&fitted.assignments) {
        counts[c] += 1;
        for (s, v) in sums[c].iter_mut().zip(point) {
            *s += v;
        }
    }

    let population_reviews = raw.iter().map(|p| p[REVIEW_COUNT]).sum::<f64>() / raw.len() as f64;

    (0..k)
        .map(|c| {
            let count = counts[c];
            let means: Vec<f64> = sums[c]
                .iter()
                .map(|s| if count == 0 { 0.0 } else { s / count as f64 })
                .collect();
            let original = scaler.inverse(&fitted.centroids[c]);

            ClusterSummary {
                index: c,
                name: cluster_name(
                    means[MEAN_SENTIMENT],
                    means[REVIEW_COUNT],
                    population_reviews,
                    means[SENTIMENT_TREND],
                ),
                member_count: count,
                share: count as f64 / eligible as f64,
                centroid_standardized: used
                    .iter()
                    .cloned()
                    .zip(fitted.centroids[c].iter().copied())
                    .collect(),
                centroid: used.iter().cloned().zip(original).collect(),
                means: FEATURE_NAMES
                    .iter()
                    .map(|f| f.to_string())
                    .zip(means.iter().copied())
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(id: &str, sentiment: f64, count: u64, trend: f64) -> UserFeatureVector {
        UserFeatureVector {
            entity_id: EntityId::from(id),
            mean_sentiment: sentiment,
            sentiment_volatility: 0.1 + sentiment.abs() / 10.0,
            mean_rating: 3.0 + sentiment * 2.0,
            review_count: count,
            sentiment_trend: trend,
        }
    }

    fn population() -> Vec<UserFeatureVector> {
        (0..12)
            .map(|i| {
                let s = if i % 2 == 0 { 0.6 } else { -0.5 };
                let count = 2 + (i % 2) * 2 + (i / 2) % 2;
                vector(&format!("u{i:02}"), s + i as f64 * 0.001, count, 0.0)
            })
            .collect()
    }

    fn params(k: usize) -> KMeansParams {
        KMeansParams {
            k,
            seed: 42,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }

    fn run(vectors: &[UserFeatureVector], k: usize) -> ClusteringOutcome {
        cluster_users(
            vectors,
            &params(k),
            &LogContext::new("test"),
            &CancellationToken::new(),
        )
        .unwrap()
    }

    #[test]
    fn every_user_gets_exactly_one_cluster() {
        let vectors = population();
        let outcome = run(&vectors, 2);
        let a = outcome.assignment.defined().unwrap();
        assert_eq!(a.assignments.len(), vectors.len());
        assert_eq!(a.eligible_entities, 12);
        let total: u64 = a.clusters.iter().map(|c| c.member_count).sum();
        assert_eq!(total, 12);
        let share: f64 = a.clusters.iter().map(|c| c.share).sum();
        assert!((share - 1.0).abs() < 1e-12);
        // constant trend column is dropped
        assert_eq!(a.dropped_features, vec!["sentiment_trend".to_string()]);
        assert!(!a.used_features.contains(&"sentiment_trend".to_string()));
    }

    #[test]
    fn k_one_is_one_full_cluster() {
        let outcome = run(&population(), 1);
        let a = outcome.assignment.defined().unwrap();
        assert_eq!(a.clusters.len(), 1);
        assert_eq!(a.clusters[0].share, 1.0);
        assert!(a.assignments.iter().all(|e| e.cluster == 0));
    }

    #[test]
    fn too_few_users_is_undefined() {
        let outcome = run(&population()[..3], 4);
        match outcome.assignment {
            Estimate::Undefined { reason, n, .. } => {
                assert_eq!(reason, UndefinedReason::TooFewEntities);
                assert_eq!(n, 3);
            }
            other => panic!("expected undefined, got {other:?}"),
        }
        assert!(outcome.model.is_none());
    }

    #[test]
    fn constant_features_are_undefined() {
        let vectors: Vec<_> = (0..5).map(|i| vector(&format!("u{i}"), 0.2, 3, 0.0)).collect();
        match run(&vectors, 2).assignment {
            Estimate::Undefined { reason, .. } => {
                assert_eq!(reason, UndefinedReason::NoUsableDimensions)
            }
            other => panic!("expected undefined, got {other:?}"),
        }
    }

    fn standardized(model: &ClusterModel, vector: &UserFeatureVector) -> Vec<f64> {
        let raw = vector.as_array();
        model
            .features
            .iter()
            .zip(model.means.iter().zip(&model.stds))
            .map(|(name, (mean, std))| {
                let d = FEATURE_NAMES.iter().position(|f| f == name).unwrap();
                (raw[d] - mean) / std
            })
            .collect()
    }

    #[test]
    fn model_reassigns_training_users() {
        let vectors = population();
        let outcome = run(&vectors, 2);
        let model = outcome.model.unwrap();
        let a = outcome.assignment.defined().unwrap();
        for (v, e) in vectors.iter().zip(&a.assignments) {
            let z = standardized(&model, v);
            assert_eq!(nearest(&model.centroids, &z).0, e.cluster);
        }
    }

    #[test]
    fn clusters_are_named() {
        let outcome = run(&population(), 2);
        let a = outcome.assignment.defined().unwrap();
        let names: Vec<_> = a.clusters.iter().map(|c| c.name.as_str()).collect();
        assert!(names.iter().any(|n| n.starts_with("Positive")));
        assert!(names.iter().any(|n| n.starts_with("Critical")));
    }
}
