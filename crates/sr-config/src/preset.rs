//! Configuration presets.
//!
//! - Standard: the documented defaults
//! - Quick: smaller correlation sample, looser k-means convergence
//! - Thorough: larger correlation sample, tighter k-means convergence

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::AnalysisConfig;
use crate::validate::ValidationError;

/// Available configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    #[default]
    Standard,
    Quick,
    Thorough,
}

impl PresetName {
    pub const ALL: &'static [PresetName] =
        &[PresetName::Standard, PresetName::Quick, PresetName::Thorough];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Standard => "standard",
            PresetName::Quick => "quick",
            PresetName::Thorough => "thorough",
        }
    }

    /// Parse preset name from string (case-insensitive, with aliases).
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "standard" | "default" => Some(PresetName::Standard),
            "quick" | "fast" => Some(PresetName::Quick),
            "thorough" | "full" => Some(PresetName::Thorough),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Standard => "Documented defaults: 50k-pair correlation sample, k=4",
            PresetName::Quick => "Large batches, 10k-pair correlation sample, loose convergence",
            PresetName::Thorough => "200k-pair correlation sample, tight convergence, more iterations",
        }
    }

    /// The configuration this preset starts from.
    pub fn config(&self) -> AnalysisConfig {
        let base = AnalysisConfig::default();
        match self {
            PresetName::Standard => base,
            PresetName::Quick => base
                .with_chunk_size(50_000)
                .with_correlation_buffer_cap(10_000)
                .with_sort_run_size(200_000)
                .with_kmeans_max_iterations(50)
                .with_kmeans_tolerance(1e-4),
            PresetName::Thorough => base
                .with_correlation_buffer_cap(200_000)
                .with_kmeans_max_iterations(300)
                .with_kmeans_tolerance(1e-9),
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| ValidationError::UnknownPreset(s.to_string()))
    }
}
