//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG path →
//! system path → built-in defaults.

use std::path::{Path, PathBuf};

/// Discovered configuration file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to analysis.json (or None when running on defaults).
    pub analysis: Option<PathBuf>,

    /// Where the path came from (for diagnostics).
    pub source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/sentiment-rating/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

pub const ENV_CONFIG_PATH: &str = "SR_CONFIG";
pub const ENV_CONFIG_DIR: &str = "SR_CONFIG_DIR";

const ANALYSIS_FILENAME: &str = "analysis.json";

/// Application name for XDG directories.
const APP_NAME: &str = "sentiment-rating";

/// Resolve the analysis config path.
///
/// 1. Explicit CLI path (taken as given; a missing file fails at load time)
/// 2. `SR_CONFIG` (taken as given)
/// 3. `SR_CONFIG_DIR` + analysis.json, if present
/// 4. `~/.config/sentiment-rating/analysis.json`, if present
/// 5. `/etc/sentiment-rating/analysis.json`, if present
/// 6. Built-in defaults (None)
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPaths {
    if let Some(path) = cli_path {
        return found(path.to_path_buf(), ConfigSource::CliArgument);
    }

    if let Some(path) = env_path(ENV_CONFIG_PATH) {
        return found(path, ConfigSource::Environment);
    }

    if let Some(dir) = env_path(ENV_CONFIG_DIR) {
        let path = dir.join(ANALYSIS_FILENAME);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(ANALYSIS_FILENAME);
        if path.exists() {
            return found(path, ConfigSource::XdgConfig);
        }
    }

    let system_path = system_config_dir().join(ANALYSIS_FILENAME);
    if system_path.exists() {
        return found(system_path, ConfigSource::SystemConfig);
    }

    ConfigPaths::default()
}

fn found(path: PathBuf, source: ConfigSource) -> ConfigPaths {
    ConfigPaths {
        analysis: Some(path),
        source,
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// XDG config directory for sentiment-rating.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
