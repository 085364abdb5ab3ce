//! Ingest accounting.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sr_common::SkipReason;

/// Counts of what the stream saw, kept and skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IngestStats {
    /// Records read from the source, valid or not.
    pub seen: u64,
    pub accepted: u64,
    pub skipped: u64,
    /// Skips per integrity reason; reasons that never occurred are absent.
    pub skip_reasons: BTreeMap<SkipReason, u64>,
    /// `skipped / seen`, 0 when nothing was seen.
    pub skip_rate: f64,
    pub batches: u64,
}

impl IngestStats {
    pub fn record_accepted(&mut self) {
        self.seen += 1;
        self.accepted += 1;
        self.refresh_rate();
    }

    pub fn record_skipped(&mut self, reason: SkipReason) {
        self.seen += 1;
        self.skipped += 1;
        *self.skip_reasons.entry(reason).or_insert(0) += 1;
        self.refresh_rate();
    }

    pub fn skips_for(&self, reason: SkipReason) -> u64 {
        self.skip_reasons.get(&reason).copied().unwrap_or(0)
    }

    fn refresh_rate(&mut self) {
        self.skip_rate = if self.seen == 0 {
            0.0
        } else {
            self.skipped as f64 / self.seen as f64
        };
    }
}
