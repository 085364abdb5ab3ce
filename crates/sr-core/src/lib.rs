//! Sentiment/Rating Core Library
//!
//! This library provides the memory-bounded statistics engine:
//! - Chunked record streaming with integrity accounting
//! - Streaming moments, Pearson/Spearman correlation and OLS regression
//! - Per-entity timelines via external sort, and time-series features
//! - K-means clustering of per-user feature vectors
//! - Report assembly, snapshot bundles and output rendering
//!
//! The binary entry point is in `main.rs`.

pub mod analysis;
pub mod bundle;
pub mod cluster;
pub mod exit_codes;
pub mod features;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod stream;
pub mod timeline;
