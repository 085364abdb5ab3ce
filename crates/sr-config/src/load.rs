//! Loading: preset base, file overlay, validation.

use std::path::PathBuf;

use crate::analysis::AnalysisConfig;
use crate::preset::PresetName;
use crate::resolve::{resolve_config, ConfigPaths};
use crate::snapshot::ConfigSnapshot;
use crate::validate::{validate_analysis, ValidationError, ValidationResult};

/// What the caller asked for.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit `--config` path.
    pub path: Option<PathBuf>,
    pub preset: PresetName,
}

/// A resolved, validated configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AnalysisConfig,
    pub paths: ConfigPaths,
    pub preset: PresetName,
    /// Raw file content, kept for the snapshot hash.
    pub raw: Option<String>,
}

impl LoadedConfig {
    /// Snapshot of the current (possibly CLI-overridden) config.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(&self.config, &self.paths, self.preset, self.raw.as_deref())
    }
}

/// Resolve, read and validate the analysis config.
///
/// Fields present in the file override the preset; absent fields keep the
/// preset's values.
pub fn load_analysis_config(options: &LoadOptions) -> ValidationResult<LoadedConfig> {
    let paths = resolve_config(options.path.as_deref());
    let base = options.preset.config();

    let (config, raw) = match &paths.analysis {
        None => (base, None),
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|e| ValidationError::IoError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            let config = overlay(&base, &raw)?;
            (config, Some(raw))
        }
    };

    validate_analysis(&config)?;

    Ok(LoadedConfig {
        config,
        paths,
        preset: options.preset,
        raw,
    })
}

/// Apply a JSON object's fields on top of `base`.
pub fn overlay(base: &AnalysisConfig, json: &str) -> ValidationResult<AnalysisConfig> {
    let parse_err = |e: serde_json::Error| ValidationError::ParseError(e.to_string());

    let file: serde_json::Value = serde_json::from_str(json).map_err(parse_err)?;
    let serde_json::Value::Object(fields) = file else {
        return Err(ValidationError::ParseError(
            "config must be a JSON object".to_string(),
        ));
    };

    let mut merged = serde_json::to_value(base).map_err(parse_err)?;
    if let serde_json::Value::Object(target) = &mut merged {
        target.extend(fields);
    }
    serde_json::from_value(merged).map_err(parse_err)
}
