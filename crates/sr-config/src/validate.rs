//! Configuration validation errors and semantic validation.
//!
//! Validation runs before any record is read; a bad parameter never
//! reaches the engine.

use thiserror::Error;

use crate::analysis::AnalysisConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Largest accepted batch size.
pub const MAX_CHUNK_SIZE: usize = 1_000_000;

/// Largest accepted worker count.
pub const MAX_WORKERS: usize = 256;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error reading {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {value} ({message})")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError { .. } => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
            ValidationError::UnknownPreset(_) => 67,
        }
    }

    fn invalid(field: &str, value: impl ToString, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for sr_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidValue {
                field,
                value,
                message,
            } => sr_common::Error::InvalidParameter {
                field,
                value,
                reason: message,
            },
            ValidationError::UnknownPreset(name) => sr_common::Error::UnknownPreset { name },
            other => sr_common::Error::Config(other.to_string()),
        }
    }
}

/// Validate an analysis configuration semantically.
pub fn validate_analysis(config: &AnalysisConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if !(1..=MAX_CHUNK_SIZE).contains(&config.chunk_size) {
        return Err(ValidationError::invalid(
            "chunk_size",
            config.chunk_size,
            format!("must be in [1, {MAX_CHUNK_SIZE}]"),
        ));
    }
    if !(1..=MAX_WORKERS).contains(&config.workers) {
        return Err(ValidationError::invalid(
            "workers",
            config.workers,
            format!("must be in [1, {MAX_WORKERS}]"),
        ));
    }
    validate_probability("max_skip_rate", config.max_skip_rate)?;

    // Rank correlation and its p-value need at least three pairs.
    if config.correlation_buffer_cap < 3 {
        return Err(ValidationError::invalid(
            "correlation_buffer_cap",
            config.correlation_buffer_cap,
            "must be at least 3",
        ));
    }
    if config.rolling_window < 1 {
        return Err(ValidationError::invalid(
            "rolling_window",
            config.rolling_window,
            "must be at least 1",
        ));
    }
    if config.sort_run_size < 1 {
        return Err(ValidationError::invalid(
            "sort_run_size",
            config.sort_run_size,
            "must be at least 1",
        ));
    }
    if config.clusters < 1 {
        return Err(ValidationError::invalid(
            "clusters",
            config.clusters,
            "must be at least 1",
        ));
    }
    if config.kmeans_max_iterations < 1 {
        return Err(ValidationError::invalid(
            "kmeans_max_iterations",
            config.kmeans_max_iterations,
            "must be at least 1",
        ));
    }
    if !config.kmeans_tolerance.is_finite() || config.kmeans_tolerance < 0.0 {
        return Err(ValidationError::invalid(
            "kmeans_tolerance",
            config.kmeans_tolerance,
            "must be finite and non-negative",
        ));
    }
    let alpha = config.significance_alpha;
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(ValidationError::invalid(
            "significance_alpha",
            alpha,
            "must be in (0, 1)",
        ));
    }

    Ok(())
}

fn validate_probability(field: &str, value: f64) -> ValidationResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::invalid(field, value, "must be in [0, 1]"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        validate_analysis(&AnalysisConfig::default()).unwrap();
    }

    #[test]
    fn zero_clusters_is_rejected() {
        let err = validate_analysis(&AnalysisConfig::default().with_clusters(0)).unwrap_err();
        match err {
            ValidationError::InvalidValue { field, .. } => assert_eq!(field, "clusters"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = validate_analysis(&AnalysisConfig::default().with_rolling_window(0)).unwrap_err();
        assert_eq!(err.code(), 65);
        assert!(err.to_string().contains("rolling_window"));
    }

    #[test]
    fn skip_rate_outside_unit_interval_is_rejected() {
        for rate in [-0.1, 1.5, f64::NAN] {
            let cfg = AnalysisConfig::default().with_max_skip_rate(rate);
            assert!(validate_analysis(&cfg).is_err(), "rate {rate}");
        }
        validate_analysis(&AnalysisConfig::default().with_max_skip_rate(1.0)).unwrap();
    }

    #[test]
    fn chunk_size_bounds() {
        assert!(validate_analysis(&AnalysisConfig::default().with_chunk_size(0)).is_err());
        assert!(
            validate_analysis(&AnalysisConfig::default().with_chunk_size(MAX_CHUNK_SIZE + 1))
                .is_err()
        );
        validate_analysis(&AnalysisConfig::default().with_chunk_size(1)).unwrap();
    }

    #[test]
    fn alpha_must_be_open_interval() {
        let config = AnalysisConfig::default().with_significance_alpha(0.0);
        assert!(validate_analysis(&config).is_err());
        let config = AnalysisConfig::default().with_significance_alpha(1.0);
        assert!(validate_analysis(&config).is_err());
    }

    #[test]
    fn version_mismatch_is_reported() {
        let mut cfg = AnalysisConfig::default();
        cfg.schema_version = "0.9.0".into();
        assert!(matches!(
            validate_analysis(&cfg),
            Err(ValidationError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn converts_to_invalid_parameter() {
        let err = validate_analysis(&AnalysisConfig::default().with_clusters(0)).unwrap_err();
        let common: sr_common::Error = err.into();
        assert_eq!(common.code(), 11);
        assert!(matches!(
            common,
            sr_common::Error::InvalidParameter { ref field, .. } if field == "clusters"
        ));
    }
}
