//! Criterion benchmarks for the clustering and feature hot paths.
//!
//! Benchmarks `step`, `fit` and `timeline_rows` over synthetic inputs.

use chrono::DateTime;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sr_common::{EntityId, ScoredReview};
use sr_core::cluster::{fit, init_plus_plus, step, KMeansParams};
use sr_core::features::timeline_rows;
use sr_core::pipeline::CancellationToken;
use sr_core::timeline::EntityTimeline;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Helpers ──────────────────────────────────────────────────────────

fn points(n: usize) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(1);
    (0..n)
        .map(|i| {
            let center = (i % 4) as f64 * 3.0;
            (0..4)
                .map(|_| center + rng.random_range(-1.0..1.0))
                .collect()
        })
        .collect()
}

fn long_timeline(len: usize) -> EntityTimeline {
    let entity_id = EntityId::from("bench");
    EntityTimeline {
        entity_id: entity_id.clone(),
        reviews: (0..len)
            .map(|i| ScoredReview {
                entity_id: entity_id.clone(),
                rating: 1 + (i % 5) as u8,
                sentiment: ((i * 37) % 200) as f64 / 100.0 - 1.0,
                timestamp: DateTime::from_timestamp_millis(i as i64 * 1000).unwrap_or_default(),
                helpful_vote: 0,
                verified: false,
            })
            .collect(),
    }
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans_step");
    for n in [1_000usize, 10_000] {
        let data = points(n);
        let mut rng = StdRng::seed_from_u64(42);
        let centroids = init_plus_plus(&data, 4, &mut rng);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| step(black_box(&centroids), black_box(data)))
        });
    }
    group.finish();
}

fn bench_fit(c: &mut Criterion) {
    let data = points(5_000);
    let params = KMeansParams {
        k: 4,
        seed: 42,
        max_iterations: 100,
        tolerance: 1e-6,
    };
    let token = CancellationToken::new();
    c.bench_function("kmeans_fit_5000", |b| {
        b.iter(|| fit(black_box(&data), &params, &token))
    });
}

fn bench_rows(c: &mut Criterion) {
    let timeline = long_timeline(10_000);
    c.bench_function("timeline_rows_10000", |b| {
        b.iter(|| timeline_rows(black_box(&timeline), 3))
    });
}

criterion_group!(benches, bench_step, bench_fit, bench_rows);
criterion_main!(benches);
