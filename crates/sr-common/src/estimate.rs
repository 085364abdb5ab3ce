//! Explicitly defined-or-undefined statistics.
//!
//! A statistic over too few samples, or over a constant variable, has no
//! value. Reporting it as zero would be indistinguishable from a real zero,
//! so every such statistic is an [`Estimate`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Why a statistic has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    /// Fewer samples than the statistic needs.
    InsufficientData,
    /// One of the variables never varies.
    ZeroVariance,
    /// Fewer eligible entities than requested clusters.
    TooFewEntities,
    /// Standardization left no dimension to cluster on.
    NoUsableDimensions,
}

impl std::fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UndefinedReason::InsufficientData => write!(f, "insufficient data"),
            UndefinedReason::ZeroVariance => write!(f, "zero variance"),
            UndefinedReason::TooFewEntities => write!(f, "too few entities"),
            UndefinedReason::NoUsableDimensions => write!(f, "no usable dimensions"),
        }
    }
}

/// A value that is either computed or explicitly not applicable.
///
/// Serializes as `{"status":"defined", ...fields}` or
/// `{"status":"undefined","reason":"zero_variance","detail":"...","n":12}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Estimate<T> {
    Defined(T),
    Undefined {
        reason: UndefinedReason,
        detail: String,
        n: u64,
    },
}

impl<T> Estimate<T> {
    pub fn undefined(reason: UndefinedReason, detail: impl Into<String>, n: u64) -> Self {
        Estimate::Undefined {
            reason,
            detail: detail.into(),
            n,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Estimate::Defined(_))
    }

    pub fn defined(&self) -> Option<&T> {
        match self {
            Estimate::Defined(v) => Some(v),
            Estimate::Undefined { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Estimate<U> {
        match self {
            Estimate::Defined(v) => Estimate::Defined(f(v)),
            Estimate::Undefined { reason, detail, n } => Estimate::Undefined { reason, detail, n },
        }
    }
}
