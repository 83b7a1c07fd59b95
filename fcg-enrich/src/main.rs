//! fcg-enrich - French wordlist enrichment
//!
//! Looks up each word of a frequency wordlist on the Académie française
//! dictionary and appends grammatical function, definition link and
//! homograph information to a results CSV. Words without an exact match go
//! to a not-found log; failed lookups go to an error log.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use fcg_common::config::{load_toml_config, resolve_config_path};
use fcg_enrich::settings::Overrides;
use fcg_enrich::{AcademieClient, Enricher, Pipeline, Settings};

/// Command-line arguments for fcg-enrich
#[derive(Parser, Debug)]
#[command(name = "fcg-enrich")]
#[command(about = "Enrich a French wordlist with Académie française dictionary entries")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "FCG_CONFIG")]
    config: Option<PathBuf>,

    /// Wordlist CSV (spreadsheet export)
    #[arg(short, long, env = "FCG_INPUT")]
    input: Option<PathBuf>,

    /// Results CSV, appended to
    #[arg(short, long, env = "FCG_OUTPUT")]
    output: Option<PathBuf>,

    /// Not-found log, appended to
    #[arg(long, env = "FCG_NOT_FOUND")]
    not_found: Option<PathBuf>,

    /// Error log, appended to
    #[arg(long, env = "FCG_ERRORS")]
    errors: Option<PathBuf>,

    /// Number of wordlist records to process
    #[arg(short, long, env = "FCG_LIMIT")]
    limit: Option<usize>,

    /// Concurrent dictionary lookups
    #[arg(long, env = "FCG_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Flush results every N completed records
    #[arg(long, env = "FCG_FLUSH_EVERY")]
    flush_every: Option<usize>,

    /// Dictionary search endpoint
    #[arg(long, env = "FCG_ENDPOINT")]
    endpoint: Option<String>,

    /// Sound link template ({lemma} is replaced by the word)
    #[arg(long, env = "FCG_SOUND_URL_TEMPLATE")]
    sound_url_template: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "FCG_REQUEST_TIMEOUT")]
    request_timeout: Option<u64>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, env = "FCG_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn into_overrides(self) -> Overrides {
        Overrides {
            input: self.input,
            output: self.output,
            not_found: self.not_found,
            errors: self.errors,
            limit: self.limit,
            concurrency: self.concurrency,
            flush_every: self.flush_every,
            endpoint: self.endpoint,
            sound_url_template: self.sound_url_template,
            request_timeout_secs: self.request_timeout,
            log_level: self.log_level,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The log level may come from the config file, so resolve it first
    let config_path = resolve_config_path(args.config.as_deref(), "FCG_CONFIG");
    let toml_config =
        load_toml_config(config_path.as_deref()).context("Failed to load configuration")?;
    let settings = Settings::resolve(args.into_overrides(), toml_config)
        .context("Invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .init();

    info!(
        "Starting fcg-enrich v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if let Some(path) = &config_path {
        info!("Config file: {}", path.display());
    }
    info!("Wordlist: {}", settings.input.display());
    info!("Results: {}", settings.output.display());

    let records = fcg_enrich::loader::load_wordlist(&settings.input)
        .with_context(|| format!("Failed to load wordlist {}", settings.input.display()))?;

    let client = AcademieClient::new(settings.endpoint.clone(), settings.request_timeout)
        .context("Failed to create dictionary client")?;
    info!("Dictionary endpoint: {}", client.endpoint());
    let enricher = Arc::new(Enricher::with_sound_url_template(
        Arc::new(client),
        settings.sound_url_template.clone(),
    ));

    let pipeline = Pipeline::new(settings.pipeline_config(), enricher);
    let summary = pipeline.run(records).await.context("Enrichment failed")?;

    info!(
        "Done: {} records, {} found ({} rows), {} not found, {} errors",
        summary.processed, summary.found, summary.rows_written, summary.not_found, summary.errors
    );
    if summary.errors > 0 {
        info!("Failed lookups logged to {}", settings.errors.display());
    }
    if summary.failed_flushes > 0 {
        warn!(
            "{} flush attempts failed before the rows were written",
            summary.failed_flushes
        );
    }
    if summary.log_write_failures > 0 {
        warn!(
            "{} not-found or error log lines could not be written",
            summary.log_write_failures
        );
    }

    Ok(())
}
