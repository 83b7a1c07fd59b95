//! Pipeline Orchestrator
//!
//! Runs the enrichment of a wordlist end to end.
//!
//! # Architecture
//! - Records are enriched concurrently via `futures::stream::buffer_unordered`
//! - Each completion is sent over a bounded channel to a single writer
//!   consumer running on a blocking thread
//! - The consumer owns the result batch and the completion counter, flushes
//!   every `flush_every` completions, and performs a final flush once the
//!   channel closes
//!
//! Workers share no mutable state and never touch the filesystem, so file
//! writes are never interleaved.
//!
//! # Error Handling
//! - Per-record isolation: lookup failures and unusable rows go to the error
//!   log, the run continues
//! - A failed flush keeps the batch and is retried on the next flush
//! - Only a failed final flush (rows that could not be persisted) fails the run

use crate::enricher::{EnrichError, Enricher};
use crate::types::{InputRecord, Outcome, RunSummary};
use crate::writer::{BatchWriter, OutputPaths, WriteError};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Default number of records processed per run
pub const DEFAULT_LIMIT: usize = 100;

/// Default flush interval, in completed records
pub const DEFAULT_FLUSH_EVERY: usize = 10;

/// Default worker count: host CPU count + 4, capped at 32
pub fn default_concurrency() -> usize {
    (num_cpus::get() + 4).min(32)
}

/// Upper bound on lookups in flight
pub const MAX_CONCURRENCY: usize = 256;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid pipeline configuration: {0}")]
    Config(String),

    #[error("Cannot prepare results table: {0}")]
    Header(#[source] WriteError),

    #[error("Final flush failed, {pending} rows not written: {source}")]
    FinalFlush {
        pending: usize,
        #[source]
        source: WriteError,
    },

    #[error("Writer task failed: {0}")]
    Writer(String),
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Only the first `limit` records are processed
    pub limit: usize,
    /// Maximum number of lookups in flight
    pub concurrency: usize,
    /// Flush the result batch every N completed records
    pub flush_every: usize,
    /// Output file locations
    pub paths: OutputPaths,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            concurrency: default_concurrency(),
            flush_every: DEFAULT_FLUSH_EVERY,
            paths: OutputPaths::in_dir(&PathBuf::from("data")),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.limit == 0 {
            return Err(PipelineError::Config("limit must be at least 1".to_string()));
        }
        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(PipelineError::Config(format!(
                "concurrency must be between 1 and {}",
                MAX_CONCURRENCY
            )));
        }
        if self.flush_every == 0 {
            return Err(PipelineError::Config(
                "flush_every must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Enrichment result for one record, as sent to the writer
#[derive(Debug)]
struct Completion {
    /// Word (or `row <n>`) used in the side logs
    label: String,
    result: Result<Outcome, EnrichError>,
}

/// Wordlist enrichment pipeline
pub struct Pipeline {
    config: PipelineConfig,
    enricher: Arc<Enricher>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, enricher: Arc<Enricher>) -> Self {
        Self { config, enricher }
    }

    /// Enrich the first `limit` records
    ///
    /// Creates the results header before any lookup is dispatched, then
    /// processes records concurrently. Returns once every dispatched record
    /// has been routed and the final flush has succeeded.
    pub async fn run(&self, records: Vec<InputRecord>) -> Result<RunSummary, PipelineError> {
        self.config.validate()?;

        let writer = BatchWriter::new(self.config.paths.clone());
        writer.ensure_header().map_err(PipelineError::Header)?;

        let total = records.len().min(self.config.limit);
        if records.len() > total {
            info!(
                total_records = records.len(),
                limit = self.config.limit,
                "Record limit applied"
            );
        }

        info!(
            records = total,
            concurrency = self.config.concurrency,
            flush_every = self.config.flush_every,
            "Starting enrichment"
        );

        let (tx, rx) = mpsc::channel::<Completion>(self.config.concurrency * 2);
        let flush_every = self.config.flush_every;
        let consumer =
            tokio::task::spawn_blocking(move || drain_completions(rx, writer, flush_every, total));

        let enricher = Arc::clone(&self.enricher);
        stream::iter(records.into_iter().take(total))
            .map(|record| {
                let enricher = Arc::clone(&enricher);
                async move {
                    let result = enricher.enrich(&record).await;
                    Completion {
                        label: record.label(),
                        result,
                    }
                }
            })
            .buffer_unordered(self.config.concurrency)
            .for_each(|completion| {
                let tx = tx.clone();
                async move {
                    if let Err(e) = tx.send(completion).await {
                        error!(word = %e.0.label, "Writer stopped, completion dropped");
                    }
                }
            })
            .await;

        // Closing the channel lets the consumer run its final flush
        drop(tx);

        let summary = consumer
            .await
            .map_err(|e| PipelineError::Writer(e.to_string()))??;

        info!(
            processed = summary.processed,
            found = summary.found,
            rows_written = summary.rows_written,
            not_found = summary.not_found,
            errors = summary.errors,
            flushes = summary.flushes,
            failed_flushes = summary.failed_flushes,
            log_write_failures = summary.log_write_failures,
            "Enrichment complete"
        );

        Ok(summary)
    }
}

/// Writer consumer: routes completions and flushes the batch
fn drain_completions(
    mut rx: mpsc::Receiver<Completion>,
    mut writer: BatchWriter,
    flush_every: usize,
    total: usize,
) -> Result<RunSummary, PipelineError> {
    let mut summary = RunSummary::default();

    while let Some(Completion { label, result }) = rx.blocking_recv() {
        summary.processed += 1;

        match result {
            Ok(Outcome::Found(rows)) => {
                summary.found += 1;
                writer.push(rows);
            }
            Ok(Outcome::NotFound) => {
                summary.not_found += 1;
                if let Err(e) = writer.append_not_found(&label) {
                    error!(word = %label, error = %e, "Failed to write not-found entry");
                    summary.log_write_failures += 1;
                }
            }
            Err(e) => {
                summary.errors += 1;
                warn!(word = %label, error = %e, "Record failed");
                if let Err(write_err) = writer.append_error(&label, &e.to_string()) {
                    error!(word = %label, error = %write_err, "Failed to write error entry");
                    summary.log_write_failures += 1;
                }
            }
        }

        if summary.processed % flush_every == 0 {
            flush_batch(&mut writer, &mut summary);
            info!(
                progress = format!("{}/{}", summary.processed, total),
                "Pipeline progress update"
            );
        }
    }

    match writer.flush() {
        Ok(written) => {
            record_flush(&mut summary, written);
            Ok(summary)
        }
        Err(source) => {
            error!(pending = writer.pending(), error = %source, "Final flush failed");
            Err(PipelineError::FinalFlush {
                pending: writer.pending(),
                source,
            })
        }
    }
}

/// Periodic flush: failures are logged and retried on the next flush
fn flush_batch(writer: &mut BatchWriter, summary: &mut RunSummary) {
    match writer.flush() {
        Ok(written) => record_flush(summary, written),
        Err(e) => {
            summary.failed_flushes += 1;
            error!(
                pending = writer.pending(),
                error = %e,
                "Flush failed, rows kept for retry"
            );
        }
    }
}

fn record_flush(summary: &mut RunSummary, written: usize) {
    if written > 0 {
        summary.flushes += 1;
        summary.rows_written += written;
        debug!(rows = written, total_rows = summary.rows_written, "Batch flushed");
    }
}
