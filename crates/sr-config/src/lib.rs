//! Analysis configuration loading and validation.
//!
//! This crate provides:
//! - The typed [`AnalysisConfig`] consumed by the engine
//! - Named presets as starting points
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation, run before any record is read
//! - Config snapshots embedded in reports for reproducibility

pub mod analysis;
pub mod load;
pub mod preset;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use analysis::AnalysisConfig;
pub use load::{load_analysis_config, LoadOptions, LoadedConfig};
pub use preset::PresetName;
pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_analysis, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
