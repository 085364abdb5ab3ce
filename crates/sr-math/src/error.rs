//! Errors for statistics that can be undefined on a given input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which variable of a paired accumulator an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// A statistic could not be computed from the data at hand.
///
/// These are never bugs: callers surface them as "undefined" results.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatError {
    #[error("insufficient data: n={n}, need at least {required}")]
    InsufficientData { n: u64, required: u64 },

    #[error("zero variance in {axis}")]
    ZeroVariance { axis: Axis },
}

impl StatError {
    /// Sample size carried by the error, when known.
    pub fn n(&self) -> Option<u64> {
        match self {
            StatError::InsufficientData { n, .. } => Some(*n),
            StatError::ZeroVariance { .. } => None,
        }
    }
}
