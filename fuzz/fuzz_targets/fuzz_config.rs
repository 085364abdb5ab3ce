//! Fuzz target for analysis.json parsing and overlay.
//!
//! Parsing and validation of arbitrary input must return errors, never
//! panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sr_config::load::overlay;
use sr_config::{validate_analysis, AnalysisConfig, PresetName};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = AnalysisConfig::from_json_str(text) {
        let _ = validate_analysis(&config);
    }
    if let Ok(config) = overlay(&PresetName::Quick.config(), text) {
        let _ = validate_analysis(&config);
    }
});
