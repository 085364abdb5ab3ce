//! Lloyd's k-means with k-means++ seeding.
//!
//! [`step`] is one pure assign-and-update iteration; [`fit`] owns seeding,
//! the convergence policy and cancellation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sr_common::Result;
use sr_config::AnalysisConfig;

use crate::logging::Stage;
use crate::pipeline::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansParams {
    pub k: usize,
    pub seed: u64,
    pub max_iterations: usize,
    /// Summed Euclidean centroid movement that counts as converged.
    pub tolerance: f64,
}

impl KMeansParams {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            k: config.clusters,
            seed: config.kmeans_seed,
            max_iterations: config.kmeans_max_iterations,
            tolerance: config.kmeans_tolerance,
        }
    }
}

/// Result of one iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub assignments: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    /// Sum of distances each centroid moved.
    pub shift: f64,
    /// Sum of squared distances to the new centroids.
    pub inertia: f64,
    /// Clusters that were empty and got a new centroid.
    pub reseeded: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub centroids: Vec<Vec<f64>>,
    pub assignments: Vec<usize>,
    pub iterations: usize,
    pub converged: bool,
    pub inertia: f64,
    pub reseeds: usize,
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index and squared distance of the closest centroid; ties go to the
/// lowest index.
pub fn nearest(centroids: &[Vec<f64>], point: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(c, point);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// Assign every point, then move each centroid to its members' mean.
///
/// An empty cluster is reseeded with the point farthest from its nearest
/// surviving centroid, and that point is moved into it. Only members of
/// clusters with more than one point are candidates, so a reseed never
/// empties another cluster.
pub fn step(centroids: &[Vec<f64>], points: &[Vec<f64>]) -> StepOutcome {
    let k = centroids.len();
    let dims = centroids.first().map_or(0, Vec::len);

    let mut assignments: Vec<usize> = points.iter().map(|p| nearest(centroids, p).0).collect();
    let mut sums = vec![vec![0.0; dims]; k];
    let mut counts = vec![0usize; k];
    for (p, &c) in points.iter().zip(&assignments) {
        counts[c] += 1;
        for (s, v) in sums[c].iter_mut().zip(p) {
            *s += v;
        }
    }

    let mut next: Vec<Option<Vec<f64>>> = sums
        .into_iter()
        .zip(&counts)
        .map(|(sum, &count)| {
            (count > 0).then(|| sum.into_iter().map(|s| s / count as f64).collect())
        })
        .collect();

    let mut reseeded = Vec::new();
    let mut taken = vec![false; points.len()];
    for j in 0..k {
        if next[j].is_some() {
            continue;
        }
        let surviving: Vec<Vec<f64>> = next.iter().flatten().cloned().collect();
        let farthest = points
            .iter()
            .enumerate()
            .filter(|(i, _)| !taken[*i] && counts[assignments[*i]] > 1)
            .map(|(i, p)| (i, nearest(&surviving, p).1))
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((i, d)),
            });
        if let Some((i, _)) = farthest {
            taken[i] = true;
            counts[assignments[i]] -= 1;
            counts[j] = 1;
            assignments[i] = j;
            next[j] = Some(points[i].clone());
            reseeded.push(j);
        }
    }

    let new_centroids: Vec<Vec<f64>> = next
        .into_iter()
        .zip(centroids)
        .map(|(c, old)| c.unwrap_or_else(|| old.clone()))
        .collect();

    let shift: f64 = centroids
        .iter()
        .zip(&new_centroids)
        .map(|(a, b)| squared_distance(a, b).sqrt())
        .sum();
    let inertia: f64 = points
        .iter()
        .zip(&assignments)
        .map(|(p, &c)| squared_distance(p, &new_centroids[c]))
        .sum();

    StepOutcome {
        assignments,
        centroids: new_centroids,
        shift,
        inertia,
        reseeded,
    }
}

/// k-means++: first centroid uniform, the rest with probability
/// proportional to squared distance from the nearest chosen centroid.
///
/// When every remaining distance is zero the lowest unchosen index is used.
pub fn init_plus_plus(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = points.len();
    if n == 0 || k == 0 {
        return Vec::new();
    }

    let first = rng.random_range(0..n);
    let mut chosen = vec![first];
    let mut d2: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &points[first]))
        .collect();

    while chosen.len() < k.min(n) {
        let total: f64 = d2.iter().sum();
        let pick = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut cumulative = 0.0;
            let mut pick = None;
            for (i, &d) in d2.iter().enumerate() {
                if d <= 0.0 {
                    continue;
                }
                cumulative += d;
                pick = Some(i);
                if cumulative > target {
                    break;
                }
            }
            pick
        } else {
            (0..n).find(|i| !chosen.contains(i))
        };

        let Some(next) = pick else { break };
        chosen.push(next);
        for (d, p) in d2.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &points[next]));
        }
    }

    chosen.into_iter().map(|i| points[i].clone()).collect()
}

/// Run Lloyd iterations until the centroids settle or the cap is hit.
///
/// Callers must supply at least `k` points.
pub fn fit(
    points: &[Vec<f64>],
    params: &KMeansParams,
    cancel: &CancellationToken,
) -> Result<KMeansFit> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut centroids = init_plus_plus(points, params.k, &mut rng);

    let mut iterations = 0;
    let mut converged = false;
    let mut reseeds = 0;
    while iterations < params.max_iterations {
        cancel.check(Stage::Cluster)?;
        let outcome = step(&centroids, points);
        iterations += 1;
        reseeds += outcome.reseeded.len();
        centroids = outcome.centroids;
        if outcome.shift < params.tolerance || outcome.shift == 0.0 {
            converged = true;
            break;
        }
    }

    let mut assignments = Vec::with_capacity(points.len());
    let mut inertia = 0.0;
    for p in points {
        let (c, d) = nearest(&centroids, p);
        assignments.push(c);
        inertia += d;
    }

    Ok(KMeansFit {
        centroids,
        assignments,
        iterations,
        converged,
        inertia,
        reseeds,
    })
}
