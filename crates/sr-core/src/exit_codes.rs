//! Exit codes for the sr-core CLI.
//!
//! Exit codes communicate the run outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0-1: Completed runs (1 = completed with warnings)
//! - 10-19: User/input errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, I/O)

use sr_common::{Error, ErrorCategory};

/// Exit codes for sr-core operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Report produced, no warnings.
    Clean = 0,

    /// Report produced with warnings (e.g. k-means hit the iteration cap).
    CleanWithWarnings = 1,

    /// Invalid arguments or configuration.
    ArgsError = 10,

    /// Too many records failed integrity checks.
    DataIntegrityError = 11,

    /// Run cancelled before completion.
    Cancelled = 12,

    /// Internal error (bug - please report).
    InternalError = 20,

    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// A report was produced (codes 0-1).
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean | ExitCode::CleanWithWarnings)
    }

    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Code name for JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::CleanWithWarnings => "OK_WARNINGS",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::DataIntegrityError => "ERR_DATA_INTEGRITY",
            ExitCode::Cancelled => "ERR_CANCELLED",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Exit code for a failed run.
    pub fn for_error(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Config => ExitCode::ArgsError,
            ErrorCategory::DataIntegrity => ExitCode::DataIntegrityError,
            ErrorCategory::Run => ExitCode::Cancelled,
            ErrorCategory::Io | ErrorCategory::Bundle => ExitCode::IoError,
            ErrorCategory::Analysis | ErrorCategory::Internal => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
