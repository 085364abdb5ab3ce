//! Chunked record stream.
//!
//! Pulls raw items from a [`ReviewSource`], validates them, and yields
//! bounded batches of [`ScoredReview`]s. Every accepted record gets a
//! stream sequence number, used later to keep timelines stable.

pub mod guard;
pub mod source;
pub mod stats;

pub use guard::SkipGuard;
pub use source::{parse_line, JsonlSource, MemorySource, RawItems, ReviewSource, SourceItem};
pub use stats::IngestStats;

use sr_common::{Error, Result, ScoredReview, SkipReason};

/// Valid records drawn from one chunk of input.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Stream sequence of the first record in `records`.
    pub start_sequence: u64,
    pub records: Vec<ScoredReview>,
}

/// Lazy batch iterator over a source.
///
/// Each batch covers `chunk_size` input items, so a batch may hold fewer
/// records than that (or none) when items were skipped. The iterator is
/// fused after the source reports an error.
pub struct ReviewStream<'a> {
    items: RawItems<'a>,
    chunk_size: usize,
    next_sequence: u64,
    stats: IngestStats,
    done: bool,
}

impl<'a> ReviewStream<'a> {
    pub fn open(source: &'a dyn ReviewSource, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidParameter {
                field: "chunk_size".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            items: source.open()?,
            chunk_size,
            next_sequence: 0,
            stats: IngestStats::default(),
            done: false,
        })
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    pub fn into_stats(self) -> IngestStats {
        self.stats
    }
}

impl Iterator for ReviewStream<'_> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let start_sequence = self.next_sequence;
        let mut records = Vec::new();
        let mut consumed = 0;

        while consumed < self.chunk_size {
            let item = match self.items.next() {
                Some(Ok(item)) => item,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    break;
                }
            };
            consumed += 1;

            let validated = match item {
                SourceItem::Record(raw) => raw.validate(),
                SourceItem::Malformed => Err(SkipReason::Malformed),
            };
            match validated {
                Ok(review) => {
                    self.stats.record_accepted();
                    self.next_sequence += 1;
                    records.push(review);
                }
                Err(reason) => self.stats.record_skipped(reason),
            }
        }

        if consumed == 0 {
            return None;
        }
        self.stats.batches += 1;
        Some(Ok(Batch {
            start_sequence,
            records,
        }))
    }
}
