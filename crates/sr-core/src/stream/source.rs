//! Record sources.
//!
//! A source hands out a fresh iterator of raw records on every `open`,
//! so a stream over it can be restarted from the beginning.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use sr_common::{Error, RawReview, Result};

/// One item read from a source before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceItem {
    Record(RawReview),
    /// The item could not be decoded as a review object.
    Malformed,
}

/// Boxed iterator of raw items; an `Err` ends the stream.
pub type RawItems<'a> = Box<dyn Iterator<Item = Result<SourceItem>> + 'a>;

/// Anything that can produce review records.
pub trait ReviewSource {
    /// Start reading from the beginning.
    fn open(&self) -> Result<RawItems<'_>>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Decode one JSON Lines line.
///
/// Returns `None` for blank lines; anything that does not deserialize into
/// a review object is `Malformed`.
pub fn parse_line(line: &[u8]) -> Option<SourceItem> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    Some(match serde_json::from_slice::<RawReview>(line) {
        Ok(raw) => SourceItem::Record(raw),
        Err(_) => SourceItem::Malformed,
    })
}

/// One JSON object per line, read lazily from disk.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    path: PathBuf,
}

impl JsonlSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReviewSource for JsonlSource {
    fn open(&self) -> Result<RawItems<'_>> {
        let reader = BufReader::new(File::open(&self.path)?);
        // Split on bytes so invalid UTF-8 is a malformed record, not an I/O failure.
        let items = reader.split(b'\n').filter_map(|line| match line {
            Ok(bytes) => parse_line(&bytes).map(Ok),
            Err(e) => Some(Err(Error::from(e))),
        });
        Ok(Box::new(items))
    }

    fn describe(&self) -> String {
        format!("jsonl:{}", self.path.display())
    }
}

/// In-memory source for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    items: Vec<SourceItem>,
}

impl MemorySource {
    pub fn new(records: Vec<RawReview>) -> Self {
        Self {
            items: records.into_iter().map(SourceItem::Record).collect(),
        }
    }

    /// Parse JSON Lines text the same way [`JsonlSource`] does.
    pub fn from_jsonl(text: &str) -> Self {
        Self {
            items: text
                .split('\n')
                .filter_map(|line| parse_line(line.as_bytes()))
                .collect(),
        }
    }

    pub fn push(&mut self, item: SourceItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ReviewSource for MemorySource {
    fn open(&self) -> Result<RawItems<'_>> {
        Ok(Box::new(self.items.iter().cloned().map(Ok)))
    }

    fn describe(&self) -> String {
        format!("memory:{} items", self.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_line_classifies() {
        assert_eq!(parse_line(b"   \r"), None);
        assert_eq!(parse_line(b"{not json"), Some(SourceItem::Malformed));
        assert_eq!(parse_line(b"[1,2]"), Some(SourceItem::Malformed));
        assert_eq!(
            parse_line(br#"{"entity_id":"u","rating":"five"}"#),
            Some(SourceItem::Malformed)
        );
        match parse_line(br#"{"entity_id":"u","rating":5}"#) {
            Some(SourceItem::Record(raw)) => {
                assert_eq!(raw.entity_id.as_deref(), Some("u"));
                assert_eq!(raw.rating, Some(5.0));
                assert_eq!(raw.sentiment, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn jsonl_source_reads_file_and_restarts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"entity_id":"a","rating":5,"sentiment":0.5,"timestamp":1}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        file.write_all(b"\xff\xfe garbage\n").unwrap();
        writeln!(
            file,
            r#"{{"entity_id":"b","rating":1,"sentiment":-0.5,"timestamp":2}}"#
        )
        .unwrap();

        let source = JsonlSource::new(file.path());
        assert!(source.describe().starts_with("jsonl:"));
        for _ in 0..2 {
            let items: Vec<_> = source.open().unwrap().map(|i| i.unwrap()).collect();
            assert_eq!(items.len(), 3);
            assert_eq!(items[1], SourceItem::Malformed);
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let source = JsonlSource::new("/nonexistent/reviews.jsonl");
        assert!(matches!(source.open(), Err(sr_common::Error::Io(_))));
    }

    #[test]
    fn memory_source_from_jsonl() {
        let source = MemorySource::from_jsonl("{\"entity_id\":\"a\"}\n\nnope\n");
        assert_eq!(source.len(), 2);
        let items: Vec<_> = source.open().unwrap().map(|i| i.unwrap()).collect();
        assert_eq!(items[1], SourceItem::Malformed);
    }
}
