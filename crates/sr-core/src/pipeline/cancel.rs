//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sr_common::{Error, Result};

use crate::logging::Stage;

/// Shared flag checked between chunks, entities and k-means iterations.
///
/// Clones share the flag, so a signal handler or another thread can hold
/// one and cancel a running analysis.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` naming `stage` once cancelled.
    pub fn check(&self, stage: Stage) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled {
                stage: stage.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let handle = token.clone();
        assert!(token.check(Stage::Ingest).is_ok());
        handle.cancel();
        assert!(token.is_cancelled());
        match token.check(Stage::Cluster) {
            Err(Error::Cancelled { stage }) => assert_eq!(stage, "cluster"),
            other => panic!("expected cancellation, got {other:?}"),
        }
    }
}
