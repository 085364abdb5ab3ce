//! Error types for the sentiment/rating engine.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! Per-record integrity problems are not errors here: they are skipped and
//! counted by the stream. Only a skip rate above the configured threshold
//! escalates to [`Error::SkipRateExceeded`].
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Skip Rate Exceeded
//!   Reason: data integrity: 600 of 1000 records skipped (rate 0.600 > threshold 0.050)
//!   Fix: Inspect the per-reason skip counts, clean the input, or raise max_skip_rate.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 20,
//!   "category": "data_integrity",
//!   "message": "data integrity: 600 of 1000 records skipped (rate 0.600 > threshold 0.050)",
//!   "recoverable": true,
//!   "suggested_action": "clean_input",
//!   "context": { "skip_rate": 0.6, "threshold": 0.05 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid or unreadable configuration.
    Config,
    /// Input records failed integrity checks in bulk.
    DataIntegrity,
    /// A pipeline stage did not produce what the report needs.
    Analysis,
    /// Run control (cancellation).
    Run,
    /// Snapshot bundle problems.
    Bundle,
    /// File I/O and serialization errors.
    Io,
    /// Bugs.
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::DataIntegrity => write!(f, "data_integrity"),
            ErrorCategory::Analysis => write!(f, "analysis"),
            ErrorCategory::Run => write!(f, "run"),
            ErrorCategory::Bundle => write!(f, "bundle"),
            ErrorCategory::Io => write!(f, "io"),
            ErrorCategory::Internal => write!(f, "internal"),
        }
    }
}

/// Suggested actions for automation reacting to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Fix the named parameter and rerun.
    FixConfig,
    /// Validate configuration with `config validate`.
    RunCheck,
    /// Clean or re-export the input records.
    CleanInput,
    /// Retry the operation.
    Retry,
    /// Abort; nothing to salvage.
    Abort,
    /// Manual intervention required.
    ManualIntervention,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::FixConfig => write!(f, "fix_config"),
            SuggestedAction::RunCheck => write!(f, "run_check"),
            SuggestedAction::CleanInput => write!(f, "clean_input"),
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::Abort => write!(f, "abort"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
        }
    }
}

/// Unified error type.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid value for {field}: {value} ({reason})")]
    InvalidParameter {
        field: String,
        value: String,
        reason: String,
    },

    #[error("unknown preset '{name}'")]
    UnknownPreset { name: String },

    // Data integrity (20-29)
    #[error(
        "data integrity: {skipped} of {seen} records skipped (rate {rate:.3} > threshold {threshold:.3})"
    )]
    SkipRateExceeded {
        skipped: u64,
        seen: u64,
        rate: f64,
        threshold: f64,
    },

    // Analysis (30-39)
    #[error("missing result: {component}")]
    MissingResult { component: String },

    // Run control (40-49)
    #[error("run cancelled during {stage}")]
    Cancelled { stage: String },

    // Bundle (50-59)
    #[error("bundle error: {0}")]
    Bundle(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Internal (70-79)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable error code, grouped by category:
    /// - 10-19: Configuration
    /// - 20-29: Data integrity
    /// - 30-39: Analysis
    /// - 40-49: Run control
    /// - 50-59: Bundle
    /// - 60-69: I/O
    /// - 70-79: Internal
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidParameter { .. } => 11,
            Error::UnknownPreset { .. } => 12,
            Error::SkipRateExceeded { .. } => 20,
            Error::MissingResult { .. } => 30,
            Error::Cancelled { .. } => 40,
            Error::Bundle(_) => 50,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::Internal(_) => 70,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidParameter { .. } | Error::UnknownPreset { .. } => {
                ErrorCategory::Config
            }
            Error::SkipRateExceeded { .. } => ErrorCategory::DataIntegrity,
            Error::MissingResult { .. } => ErrorCategory::Analysis,
            Error::Cancelled { .. } => ErrorCategory::Run,
            Error::Bundle(_) => ErrorCategory::Bundle,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
            Error::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Whether a rerun with different input or settings can succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::InvalidParameter { .. } => true,
            Error::UnknownPreset { .. } => true,
            Error::SkipRateExceeded { .. } => true,
            Error::MissingResult { .. } => false,
            Error::Cancelled { .. } => true,
            Error::Bundle(_) => true,
            Error::Io(_) => true,
            Error::Json(_) => true,
            Error::Internal(_) => false,
        }
    }

    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::Config(_) => SuggestedAction::RunCheck,
            Error::InvalidParameter { .. } => SuggestedAction::FixConfig,
            Error::UnknownPreset { .. } => SuggestedAction::FixConfig,
            Error::SkipRateExceeded { .. } => SuggestedAction::CleanInput,
            Error::MissingResult { .. } => SuggestedAction::ManualIntervention,
            Error::Cancelled { .. } => SuggestedAction::Retry,
            Error::Bundle(_) => SuggestedAction::Retry,
            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::CleanInput,
            Error::Internal(_) => SuggestedAction::Abort,
        }
    }

    /// Human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Run 'sr-core config validate <file>' to see what is wrong with the configuration."
            }
            Error::InvalidParameter { .. } => {
                "Correct the named parameter in the config file or on the command line."
            }
            Error::UnknownPreset { .. } => "Use one of the presets: standard, quick, thorough.",
            Error::SkipRateExceeded { .. } => {
                "Inspect the per-reason skip counts, clean the input, or raise max_skip_rate."
            }
            Error::MissingResult { .. } => {
                "An analysis stage produced no result. Rerun with -vv and report the log."
            }
            Error::Cancelled { .. } => "The run was interrupted. Start it again.",
            Error::Bundle(_) => {
                "The snapshot bundle is unreadable or corrupted. Re-create it with 'analyze --bundle'."
            }
            Error::Io(_) => "Check that the input path exists and the output location is writable.",
            Error::Json(_) => "Invalid JSON. Check the file with 'jq .' or regenerate it.",
            Error::Internal(_) => "This is a bug. Rerun with -vv and report the log.",
        }
    }

    /// Short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidParameter { .. } => "Invalid Parameter",
            Error::UnknownPreset { .. } => "Unknown Preset",
            Error::SkipRateExceeded { .. } => "Skip Rate Exceeded",
            Error::MissingResult { .. } => "Missing Analysis Result",
            Error::Cancelled { .. } => "Run Cancelled",
            Error::Bundle(_) => "Bundle Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
            Error::Internal(_) => "Internal Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: u32,
    pub category: ErrorCategory,
    pub message: String,
    pub recoverable: bool,
    pub suggested_action: SuggestedAction,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::InvalidParameter { field, value, .. } => {
                context.insert("field".to_string(), serde_json::json!(field));
                context.insert("value".to_string(), serde_json::json!(value));
            }
            Error::UnknownPreset { name } => {
                context.insert("preset".to_string(), serde_json::json!(name));
            }
            Error::SkipRateExceeded {
                skipped,
                seen,
                rate,
                threshold,
            } => {
                context.insert("skipped".to_string(), serde_json::json!(skipped));
                context.insert("seen".to_string(), serde_json::json!(seen));
                context.insert("skip_rate".to_string(), serde_json::json!(rate));
                context.insert("threshold".to_string(), serde_json::json!(threshold));
            }
            Error::MissingResult { component } => {
                context.insert("component".to_string(), serde_json::json!(component));
            }
            Error::Cancelled { stage } => {
                context.insert("stage".to_string(), serde_json::json!(stage));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

/// Format an error for human-readable stderr output.
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skip_error() -> Error {
        Error::SkipRateExceeded {
            skipped: 600,
            seen: 1000,
            rate: 0.6,
            threshold: 0.05,
        }
    }

    #[test]
    fn test_error_code() {
        assert_eq!(Error::Config("x".into()).code(), 10);
        assert_eq!(skip_error().code(), 20);
        assert_eq!(
            Error::Cancelled {
                stage: "ingest".into()
            }
            .code(),
            40
        );
    }

    #[test]
    fn test_error_category() {
        assert_eq!(skip_error().category(), ErrorCategory::DataIntegrity);
        assert_eq!(
            Error::InvalidParameter {
                field: "clusters".into(),
                value: "0".into(),
                reason: "must be at least 1".into()
            }
            .category(),
            ErrorCategory::Config
        );
        assert_eq!(
            Error::MissingResult {
                component: "pearson".into()
            }
            .category(),
            ErrorCategory::Analysis
        );
    }

    #[test]
    fn test_skip_rate_message_names_rate_and_threshold() {
        let msg = skip_error().to_string();
        assert!(msg.contains("600 of 1000"));
        assert!(msg.contains("0.600"));
        assert!(msg.contains("0.050"));
    }

    #[test]
    fn test_structured_error_context() {
        let structured = StructuredError::from(&skip_error());
        assert_eq!(structured.code, 20);
        assert_eq!(structured.suggested_action, SuggestedAction::CleanInput);
        assert_eq!(
            structured.context.get("threshold"),
            Some(&serde_json::json!(0.05))
        );
    }

    #[test]
    fn test_structured_error_json() {
        let err = Error::InvalidParameter {
            field: "rolling_window".into(),
            value: "0".into(),
            reason: "must be at least 1".into(),
        };
        let json = StructuredError::from(&err).to_json();
        assert!(json.contains(r#""code":11"#));
        assert!(json.contains(r#""category":"config""#));
        assert!(json.contains(r#""suggested_action":"fix_config""#));
        assert!(json.contains(r#""field":"rolling_window""#));
    }

    #[test]
    fn test_format_error_human() {
        let formatted = format_error_human(&skip_error(), false);
        assert!(formatted.contains("Skip Rate Exceeded"));
        assert!(formatted.contains("max_skip_rate"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::DataIntegrity.to_string(), "data_integrity");
        assert_eq!(SuggestedAction::CleanInput.to_string(), "clean_input");
    }
}
