//! Skip-rate guard.
//!
//! Individual bad records are skipped and counted. Too many of them means
//! the input is not what the analysis assumes, and the run must stop
//! before producing a report.

use sr_common::{Error, Result};
use sr_config::AnalysisConfig;

use super::stats::IngestStats;

#[derive(Debug, Clone, Copy)]
pub struct SkipGuard {
    max_rate: f64,
    min_records: u64,
}

impl SkipGuard {
    pub fn new(max_rate: f64, min_records: u64) -> Self {
        Self {
            max_rate,
            min_records,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.max_skip_rate, config.min_records_for_skip_check)
    }

    /// Fail when the observed skip rate exceeds the threshold.
    ///
    /// Mid-stream checks wait until `min_records` records have been seen;
    /// the end-of-stream check always applies.
    pub fn check(&self, stats: &IngestStats, at_end: bool) -> Result<()> {
        if stats.seen == 0 || (!at_end && stats.seen < self.min_records) {
            return Ok(());
        }
        if stats.skip_rate > self.max_rate {
            return Err(Error::SkipRateExceeded {
                skipped: stats.skipped,
                seen: stats.seen,
                rate: stats.skip_rate,
                threshold: self.max_rate,
            });
        }
        Ok(())
    }
}
