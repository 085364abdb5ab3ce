//! Pearson and Spearman correlation with Student-t significance.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sr_common::Estimate;
use sr_math::{correlation_p_value, MomentState};

use super::{undefined_from, AxisLabels};

/// A correlation coefficient and its significance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CorrelationResult {
    /// Coefficient in [-1, 1].
    pub coefficient: f64,
    /// Two-tailed p-value; absent when fewer than 3 pairs.
    pub p_value: Option<f64>,
    /// `p_value < significance_alpha`.
    pub significant: bool,
    /// Pairs the coefficient was computed from.
    pub n: u64,
    /// Pairs in the full stream (larger than `n` when sampled).
    pub population: u64,
    pub sampled: bool,
}

impl CorrelationResult {
    pub fn new(coefficient: f64, n: u64, population: u64, alpha: f64) -> Self {
        let p_value = correlation_p_value(coefficient, n).ok();
        Self {
            coefficient,
            p_value,
            significant: p_value.is_some_and(|p| p < alpha),
            n,
            population,
            sampled: n < population,
        }
    }
}

/// Pearson r from streamed moments.
pub fn pearson(
    moments: &MomentState,
    alpha: f64,
    labels: AxisLabels,
) -> Estimate<CorrelationResult> {
    match moments.pearson() {
        Ok(r) => Estimate::Defined(CorrelationResult::new(r, moments.n, moments.n, alpha)),
        Err(e) => undefined_from(&e, moments.n, labels),
    }
}

/// Spearman rho over the (possibly sampled) pair buffer.
pub fn spearman_from_sample(
    pairs: &[(f64, f64)],
    population: u64,
    alpha: f64,
    labels: AxisLabels,
) -> Estimate<CorrelationResult> {
    let n = pairs.len() as u64;
    match sr_math::spearman(pairs) {
        Ok(rho) => Estimate::Defined(CorrelationResult::new(rho, n, population.max(n), alpha)),
        Err(e) => undefined_from(&e, n, labels),
    }
}
