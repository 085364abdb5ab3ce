//! External merge sort of reviews into entity timelines.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sr_common::{Error, Result, ScoredReview};
use sr_config::AnalysisConfig;
use tracing::debug;

use super::EntityTimeline;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SortEntry {
    seq: u64,
    review: ScoredReview,
}

impl SortEntry {
    fn key_cmp(&self, other: &SortEntry) -> Ordering {
        self.review
            .entity_id
            .cmp(&other.review.entity_id)
            .then(self.review.timestamp.cmp(&other.review.timestamp))
            .then(self.seq.cmp(&other.seq))
    }
}

/// Collects reviews and yields them grouped by entity.
///
/// Buffers up to `run_size` entries; when the buffer is full and another
/// entry arrives, the buffer is sorted and spilled to an anonymous temp
/// file. Input that fits in one run never touches disk.
pub struct ExternalSorter {
    run_size: usize,
    spill_dir: Option<PathBuf>,
    buffer: Vec<SortEntry>,
    runs: Vec<File>,
}

impl ExternalSorter {
    pub fn new(run_size: usize, spill_dir: Option<PathBuf>) -> Self {
        Self {
            run_size: run_size.max(1),
            spill_dir,
            buffer: Vec::new(),
            runs: Vec::new(),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.sort_run_size, config.spill_dir.clone())
    }

    /// Add a review with its stream sequence number.
    pub fn push(&mut self, seq: u64, review: ScoredReview) -> Result<()> {
        if self.buffer.len() >= self.run_size {
            self.spill()?;
        }
        self.buffer.push(SortEntry { seq, review });
        Ok(())
    }

    /// Runs written to disk so far.
    pub fn spilled_runs(&self) -> usize {
        self.runs.len()
    }

    fn spill(&mut self) -> Result<()> {
        self.buffer.sort_by(SortEntry::key_cmp);
        let file = match &self.spill_dir {
            Some(dir) => tempfile::tempfile_in(dir)?,
            None => tempfile::tempfile()?,
        };

        let mut writer = BufWriter::new(file);
        let entries = self.buffer.len();
        for entry in self.buffer.drain(..) {
            serde_json::to_writer(&mut writer, &entry)?;
            writer.write_all(b"\n")?;
        }
        let mut file = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        file.seek(SeekFrom::Start(0))?;

        debug!(run = self.runs.len(), entries, "Sorted run spilled");
        self.runs.push(file);
        Ok(())
    }

    /// Finish sorting and iterate timelines in entity order.
    pub fn finish(mut self) -> Result<TimelineIter> {
        let entries = if self.runs.is_empty() {
            self.buffer.sort_by(SortEntry::key_cmp);
            Entries::Memory(self.buffer.into_iter())
        } else {
            if !self.buffer.is_empty() {
                self.spill()?;
            }
            Entries::Merge(KWayMerge::new(self.runs)?)
        };
        Ok(TimelineIter {
            entries,
            pending: None,
            failed: false,
        })
    }
}

struct RunReader {
    reader: BufReader<File>,
    line: String,
}

impl RunReader {
    fn next_entry(&mut self) -> Result<Option<SortEntry>> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(self.line.trim_end())?))
    }
}

struct HeapItem {
    entry: SortEntry,
    run: usize,
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.entry
            .key_cmp(&other.entry)
            .then(self.run.cmp(&other.run))
    }
}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapItem {}

/// Min-heap merge over sorted run files.
struct KWayMerge {
    readers: Vec<RunReader>,
    heap: BinaryHeap<Reverse<HeapItem>>,
}

impl KWayMerge {
    fn new(runs: Vec<File>) -> Result<Self> {
        debug!(runs = runs.len(), "Merging sorted runs");
        let mut readers: Vec<RunReader> = runs
            .into_iter()
            .map(|file| RunReader {
                reader: BufReader::new(file),
                line: String::new(),
            })
            .collect();

        let mut heap = BinaryHeap::with_capacity(readers.len());
        for (run, reader) in readers.iter_mut().enumerate() {
            if let Some(entry) = reader.next_entry()? {
                heap.push(Reverse(HeapItem { entry, run }));
            }
        }
        Ok(Self { readers, heap })
    }

    fn next_entry(&mut self) -> Result<Option<SortEntry>> {
        let Some(Reverse(HeapItem { entry, run })) = self.heap.pop() else {
            return Ok(None);
        };
        if let Some(next) = self.readers[run].next_entry()? {
            self.heap.push(Reverse(HeapItem { entry: next, run }));
        }
        Ok(Some(entry))
    }
}

enum Entries {
    Memory(std::vec::IntoIter<SortEntry>),
    Merge(KWayMerge),
}

impl Entries {
    fn next_entry(&mut self) -> Result<Option<SortEntry>> {
        match self {
            Entries::Memory(iter) => Ok(iter.next()),
            Entries::Merge(merge) => merge.next_entry(),
        }
    }
}

/// Timelines in ascending entity order. Fused after the first error.
pub struct TimelineIter {
    entries: Entries,
    pending: Option<SortEntry>,
    failed: bool,
}

impl TimelineIter {
    fn pull(&mut self) -> Result<Option<SortEntry>> {
        match self.pending.take() {
            Some(entry) => Ok(Some(entry)),
            None => self.entries.next_entry(),
        }
    }

    fn next_timeline(&mut self) -> Result<Option<EntityTimeline>> {
        let Some(first) = self.pull()? else {
            return Ok(None);
        };
        let entity_id = first.review.entity_id.clone();
        let mut reviews = vec![first.review];

        while let Some(entry) = self.entries.next_entry()? {
            if entry.review.entity_id != entity_id {
                self.pending = Some(entry);
                break;
            }
            reviews.push(entry.review);
        }
        Ok(Some(EntityTimeline { entity_id, reviews }))
    }
}

impl Iterator for TimelineIter {
    type Item = Result<EntityTimeline>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_timeline() {
            Ok(timeline) => timeline.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
