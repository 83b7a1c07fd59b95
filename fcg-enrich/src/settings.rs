//! Resolved run configuration for fcg-enrich
//!
//! Merges the configuration layers, highest priority first:
//! 1. Command-line arguments and environment variables (`Overrides`)
//! 2. TOML configuration file (`TomlConfig`)
//! 3. Built-in defaults (code constants)

use crate::enricher::{DEFAULT_SOUND_URL_TEMPLATE, LEMMA_PLACEHOLDER};
use crate::lookup::{ACADEMIE_SEARCH_URL, DEFAULT_TIMEOUT};
use crate::pipeline::{
    default_concurrency, PipelineConfig, DEFAULT_FLUSH_EVERY, DEFAULT_LIMIT, MAX_CONCURRENCY,
};
use crate::writer::OutputPaths;
use fcg_common::config::TomlConfig;
use fcg_common::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default data directory, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub not_found: Option<PathBuf>,
    pub errors: Option<PathBuf>,
    pub limit: Option<usize>,
    pub concurrency: Option<usize>,
    pub flush_every: Option<usize>,
    pub endpoint: Option<String>,
    pub sound_url_template: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

/// Fully resolved run configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub not_found: PathBuf,
    pub errors: PathBuf,
    pub limit: usize,
    pub concurrency: usize,
    pub flush_every: usize,
    pub endpoint: String,
    pub sound_url_template: String,
    pub request_timeout: Duration,
    pub log_level: String,
}

impl Settings {
    /// Merge overrides over the TOML config over the defaults, then validate
    pub fn resolve(overrides: Overrides, toml: TomlConfig) -> Result<Self> {
        let data_dir = PathBuf::from(DEFAULT_DATA_DIR);

        let settings = Self {
            input: overrides
                .input
                .or(toml.input)
                .unwrap_or_else(|| data_dir.join("wordlist.csv")),
            output: overrides
                .output
                .or(toml.output)
                .unwrap_or_else(|| data_dir.join("results.csv")),
            not_found: overrides
                .not_found
                .or(toml.not_found)
                .unwrap_or_else(|| data_dir.join("not_found.txt")),
            errors: overrides
                .errors
                .or(toml.errors)
                .unwrap_or_else(|| data_dir.join("errors.txt")),
            limit: overrides.limit.or(toml.limit).unwrap_or(DEFAULT_LIMIT),
            concurrency: overrides
                .concurrency
                .or(toml.concurrency)
                .unwrap_or_else(default_concurrency),
            flush_every: overrides
                .flush_every
                .or(toml.flush_every)
                .unwrap_or(DEFAULT_FLUSH_EVERY),
            endpoint: overrides
                .endpoint
                .or(toml.endpoint)
                .unwrap_or_else(|| ACADEMIE_SEARCH_URL.to_string()),
            sound_url_template: overrides
                .sound_url_template
                .or(toml.sound_url_template)
                .unwrap_or_else(|| DEFAULT_SOUND_URL_TEMPLATE.to_string()),
            request_timeout: overrides
                .request_timeout_secs
                .or(toml.request_timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            log_level: overrides.log_level.unwrap_or(toml.logging.level),
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("limit", self.limit),
            ("concurrency", self.concurrency),
            ("flush_every", self.flush_every),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{} must be at least 1", name)));
            }
        }

        if self.concurrency > MAX_CONCURRENCY {
            return Err(Error::Config(format!(
                "concurrency must be at most {}, got {}",
                MAX_CONCURRENCY, self.concurrency
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(Error::Config(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }

        if !self.sound_url_template.contains(LEMMA_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "sound_url_template must contain {}",
                LEMMA_PLACEHOLDER
            )));
        }

        Ok(())
    }

    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            results: self.output.clone(),
            not_found: self.not_found.clone(),
            errors: self.errors.clone(),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            limit: self.limit,
            concurrency: self.concurrency,
            flush_every: self.flush_every,
            paths: self.output_paths(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcg_common::config::LoggingConfig;

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(Overrides::default(), TomlConfig::default()).unwrap();

        assert_eq!(settings.input, PathBuf::from("data/wordlist.csv"));
        assert_eq!(settings.output, PathBuf::from("data/results.csv"));
        assert_eq!(settings.not_found, PathBuf::from("data/not_found.txt"));
        assert_eq!(settings.errors, PathBuf::from("data/errors.txt"));
        assert_eq!(settings.limit, 100);
        assert_eq!(settings.flush_every, 10);
        assert_eq!(settings.concurrency, default_concurrency());
        assert_eq!(settings.endpoint, ACADEMIE_SEARCH_URL);
        assert_eq!(settings.sound_url_template, "https://forvo.com/word/{lemma}");
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_toml_over_defaults() {
        let toml = TomlConfig {
            limit: Some(500),
            flush_every: Some(50),
            output: Some(PathBuf::from("/tmp/out.csv")),
            logging: LoggingConfig {
                level: "debug".to_string(),
            },
            ..Default::default()
        };

        let settings = Settings::resolve(Overrides::default(), toml).unwrap();
        assert_eq!(settings.limit, 500);
        assert_eq!(settings.flush_every, 50);
        assert_eq!(settings.output, PathBuf::from("/tmp/out.csv"));
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_overrides_over_toml() {
        let toml = TomlConfig {
            limit: Some(500),
            concurrency: Some(2),
            ..Default::default()
        };
        let overrides = Overrides {
            limit: Some(5),
            log_level: Some("warn".to_string()),
            ..Default::default()
        };

        let settings = Settings::resolve(overrides, toml).unwrap();
        assert_eq!(settings.limit, 5);
        assert_eq!(settings.concurrency, 2);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_zero_flush_interval_rejected() {
        let overrides = Overrides {
            flush_every: Some(0),
            ..Default::default()
        };
        let result = Settings::resolve(overrides, TomlConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_excessive_concurrency_rejected() {
        let overrides = Overrides {
            concurrency: Some(MAX_CONCURRENCY + 1),
            ..Default::default()
        };
        let result = Settings::resolve(overrides, TomlConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let overrides = Overrides {
            sound_url_template: Some("https://forvo.com/word/".to_string()),
            ..Default::default()
        };
        assert!(Settings::resolve(overrides, TomlConfig::default()).is_err());
    }

    #[test]
    fn test_non_http_endpoint_rejected() {
        let overrides = Overrides {
            endpoint: Some("ftp://dict.test".to_string()),
            ..Default::default()
        };
        assert!(Settings::resolve(overrides, TomlConfig::default()).is_err());
    }

    #[test]
    fn test_pipeline_config() {
        let overrides = Overrides {
            limit: Some(7),
            concurrency: Some(3),
            flush_every: Some(2),
            errors: Some(PathBuf::from("/tmp/errors.txt")),
            ..Default::default()
        };
        let config = Settings::resolve(overrides, TomlConfig::default())
            .unwrap()
            .pipeline_config();

        assert_eq!(config.limit, 7);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.flush_every, 2);
        assert_eq!(config.paths.errors, PathBuf::from("/tmp/errors.txt"));
        assert_eq!(config.paths.results, PathBuf::from("data/results.csv"));
    }
}
