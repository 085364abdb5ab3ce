//! Fuzz target for review line parsing and validation.
//!
//! Any byte string must either be skipped, counted as malformed, or turn
//! into a review whose fields are inside the declared ranges.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sr_core::stream::{parse_line, SourceItem};

fuzz_target!(|data: &[u8]| {
    for line in data.split(|&b| b == b'\n') {
        if let Some(SourceItem::Record(raw)) = parse_line(line) {
            if let Ok(review) = raw.validate() {
                assert!((1..=5).contains(&review.rating));
                assert!((-1.0..=1.0).contains(&review.sentiment));
                assert!(!review.entity_id.as_str().trim().is_empty());
            }
        }
    }
});
