//! Common types for the sentiment/rating engine.
//!
//! This crate provides foundational types shared across the workspace:
//! - Review records and their integrity rules
//! - Entity and run identifiers
//! - The unified error taxonomy
//! - Output format selection
//! - `Estimate<T>` for statistics that may be undefined

pub mod error;
pub mod estimate;
pub mod id;
pub mod output;
pub mod record;

pub use error::{Error, ErrorCategory, Result, StructuredError, SuggestedAction};
pub use estimate::{Estimate, UndefinedReason};
pub use id::{EntityId, RunId};
pub use output::OutputFormat;
pub use record::{RawReview, ScoredReview, SentimentCategory, SkipReason};

/// Schema version of every serialized output structure.
pub const SCHEMA_VERSION: &str = "1.0.0";
