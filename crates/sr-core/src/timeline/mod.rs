//! Per-entity timelines.
//!
//! Reviews are grouped by entity with an external merge sort on
//! (entity_id, timestamp, stream sequence), so memory stays bounded by the
//! sort run size plus the largest single timeline.

pub mod sort;

pub use sort::{ExternalSorter, TimelineIter};

use sr_common::{EntityId, ScoredReview};

/// One entity's reviews in time order; equal timestamps keep stream order.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTimeline {
    pub entity_id: EntityId,
    pub reviews: Vec<ScoredReview>,
}

impl EntityTimeline {
    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn sentiments(&self) -> impl Iterator<Item = f64> + '_ {
        self.reviews.iter().map(|r| r.sentiment)
    }
}
