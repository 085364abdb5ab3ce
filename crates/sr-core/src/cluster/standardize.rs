//! Z-score standardization with zero-variance dimensions removed.

/// Per-dimension mean and population standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
    /// Dimensions kept, in input order.
    pub kept: Vec<usize>,
    /// Dimensions with zero (or non-finite) spread.
    pub dropped: Vec<usize>,
}

/// Spread below this fraction of the mean's magnitude is rounding noise.
const RELATIVE_FLOOR: f64 = 1e-12;

impl Standardizer {
    /// Fit on row-major points of equal width `dims`.
    pub fn fit(points: &[Vec<f64>], dims: usize) -> Self {
        let n = points.len() as f64;
        let mut means = vec![0.0; dims];
        let mut stds = vec![0.0; dims];

        if !points.is_empty() {
            for d in 0..dims {
                let mean = points.iter().map(|p| p[d]).sum::<f64>() / n;
                let ss: f64 = points.iter().map(|p| (p[d] - mean) * (p[d] - mean)).sum();
                means[d] = mean;
                stds[d] = (ss / n).sqrt();
            }
        }

        let (kept, dropped): (Vec<usize>, Vec<usize>) = (0..dims).partition(|&d| {
            stds[d].is_finite() && stds[d] > RELATIVE_FLOOR * means[d].abs().max(1.0)
        });
        Self {
            means,
            stds,
            kept,
            dropped,
        }
    }

    /// Z-scores of the kept dimensions.
    pub fn transform(&self, point: &[f64]) -> Vec<f64> {
        self.kept
            .iter()
            .map(|&d| (point[d] - self.means[d]) / self.stds[d])
            .collect()
    }

    /// Map a standardized point back to original units (kept dimensions).
    pub fn inverse(&self, z: &[f64]) -> Vec<f64> {
        self.kept
            .iter()
            .zip(z)
            .map(|(&d, v)| v * self.stds[d] + self.means[d])
            .collect()
    }

    pub fn usable(&self) -> bool {
        !self.kept.is_empty()
    }
}
