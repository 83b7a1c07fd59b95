//! Configuration loading and config file resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! This module owns the TOML layer and config file discovery. Merging the
//! layers into a resolved run configuration is done by the consuming binary.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "fcg";

/// Default config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// TOML configuration file contents
///
/// Every field is optional. Absent fields fall through to the
/// built-in defaults of the consuming tool.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Wordlist CSV to read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,

    /// Results CSV (append-only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Not-found log (one word per line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_found: Option<PathBuf>,

    /// Error log (word and reason per line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<PathBuf>,

    /// Maximum number of input records to process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Number of concurrent lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Flush the result batch every N completed records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flush_every: Option<usize>,

    /// Dictionary search endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Sound URL template, `{lemma}` is replaced by the word
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_url_template: Option<String>,

    /// Per-request timeout for dictionary lookups (seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Platform config file location: `<config_dir>/fcg/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Resolve which config file to read
///
/// Priority order:
/// 1. Command-line argument
/// 2. Environment variable `env_var_name`
/// 3. Platform default, only if the file exists
///
/// Returns `None` when no config file applies.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform default
    default_config_path().filter(|p| p.exists())
}

/// Load TOML configuration
///
/// A missing file is not fatal: a warning is logged and defaults are used.
/// A file that exists but cannot be read or parsed is an error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        debug!("No config file configured, using defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Write TOML configuration atomically
///
/// Serializes to `<path>.tmp` then renames over the target, so readers
/// never observe a half-written file. Parent directories are created.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    std::fs::write(&temp_path, content)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(Error::Io(e));
    }

    debug!("Wrote configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_default_level() {
        assert_eq!(LoggingConfig::default().level, "info");
    }

    #[test]
    fn test_empty_toml_parses_to_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config: TomlConfig = toml::from_str(
            r#"
            limit = 250
            flush_every = 25

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.limit, Some(250));
        assert_eq!(config.flush_every, Some(25));
        assert_eq!(config.concurrency, None);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result: std::result::Result<TomlConfig, _> = toml::from_str("limit = \"many\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_path_ends_with_fcg() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("fcg/config.toml"));
        }
    }
}
