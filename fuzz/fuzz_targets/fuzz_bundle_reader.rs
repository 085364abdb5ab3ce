//! Fuzz target for .srb bundle reading.
//!
//! Bundles may come from untrusted sources; arbitrary bytes must produce
//! an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sr_bundle::BundleReader;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut reader) = BundleReader::from_bytes(data.to_vec()) {
        let _ = reader.verify_all();
        let _ = reader.read_report::<serde_json::Value>();
    }
});
