//! Results persistence
//!
//! `BatchWriter` buffers result rows and appends them to the results CSV in
//! batches. Not-found and error log lines are written immediately.
//!
//! All three files are append-only. The results header is written once,
//! when the file is created, and never rewritten.

use crate::schema;
use crate::types::EnrichedRow;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

/// Results persistence errors
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),
}

impl WriteError {
    fn io(path: &Path, source: io::Error) -> Self {
        WriteError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Output file locations
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    /// Results CSV
    pub results: PathBuf,
    /// Not-found log, one word per line
    pub not_found: PathBuf,
    /// Error log, `word<TAB>reason` per line
    pub errors: PathBuf,
}

impl OutputPaths {
    /// `results.csv`, `not_found.txt` and `errors.txt` under `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            results: dir.join("results.csv"),
            not_found: dir.join("not_found.txt"),
            errors: dir.join("errors.txt"),
        }
    }
}

/// Buffered writer for the results table and its side logs
pub struct BatchWriter {
    paths: OutputPaths,
    batch: Vec<EnrichedRow>,
}

impl BatchWriter {
    pub fn new(paths: OutputPaths) -> Self {
        Self {
            paths,
            batch: Vec::new(),
        }
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    /// Rows buffered and not yet written
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// Buffer rows for the next flush
    pub fn push(&mut self, rows: Vec<EnrichedRow>) {
        self.batch.extend(rows);
    }

    /// Create the results file with its header if it does not exist
    ///
    /// Returns `true` if the file was created. An existing file is left
    /// untouched, whatever its contents.
    pub fn ensure_header(&self) -> Result<bool, WriteError> {
        ensure_header(&self.paths.results)
    }

    /// Append all buffered rows to the results table
    ///
    /// The batch is cleared only once the rows are written. On error the
    /// rows stay buffered and the next flush retries them.
    ///
    /// # Returns
    /// Number of rows written (0 when the batch is empty)
    pub fn flush(&mut self) -> Result<usize, WriteError> {
        if self.batch.is_empty() {
            return Ok(0);
        }

        self.ensure_header()?;

        // Encode the whole batch first so the file sees a single append
        let mut encoder = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        for row in &self.batch {
            encoder.write_record(schema::record(row))?;
        }
        let bytes = encoder
            .into_inner()
            .map_err(|e| WriteError::io(&self.paths.results, e.into_error()))?;

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.paths.results)
            .map_err(|e| WriteError::io(&self.paths.results, e))?;
        append_or_rollback(&mut file, &bytes)
            .map_err(|e| WriteError::io(&self.paths.results, e))?;

        let written = self.batch.len();
        self.batch.clear();

        debug!(
            rows = written,
            path = %self.paths.results.display(),
            "Flushed result batch"
        );
        Ok(written)
    }

    /// Append a word to the not-found log
    pub fn append_not_found(&self, word: &str) -> Result<(), WriteError> {
        append_line(&self.paths.not_found, &single_line(word))
    }

    /// Append a word and failure reason to the error log
    pub fn append_error(&self, word: &str, reason: &str) -> Result<(), WriteError> {
        let line = format!("{}\t{}", single_line(word), single_line(reason));
        append_line(&self.paths.errors, &line)
    }
}

/// Create `path` with the results header unless it already exists
pub fn ensure_header(path: &Path) -> Result<bool, WriteError> {
    create_parent_dir(path)?;

    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(WriteError::io(path, e)),
    };

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(schema::header())?;
    writer.flush().map_err(|e| WriteError::io(path, e))?;

    info!(path = %path.display(), "Created results table");
    Ok(true)
}

fn append_line(path: &Path, line: &str) -> Result<(), WriteError> {
    let mut file = open_append(path)?;
    writeln!(file, "{}", line).map_err(|e| WriteError::io(path, e))
}

fn open_append(path: &Path) -> Result<File, WriteError> {
    create_parent_dir(path)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| WriteError::io(path, e))
}

fn create_parent_dir(path: &Path) -> Result<(), WriteError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| WriteError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// File that can be appended to and cut back to a previous length
trait AppendTarget: Write {
    fn current_len(&self) -> io::Result<u64>;
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl AppendTarget for File {
    fn current_len(&self) -> io::Result<u64> {
        self.metadata().map(|m| m.len())
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Append `bytes` as a unit
///
/// A write that fails partway is cut back to the original length so a retry
/// never duplicates rows or leaves a torn line behind.
fn append_or_rollback<F: AppendTarget>(file: &mut F, bytes: &[u8]) -> io::Result<()> {
    let start = file.current_len()?;
    let result = file.write_all(bytes).and_then(|_| file.flush());
    if let Err(e) = result {
        if let Err(truncate_err) = file.truncate_to(start) {
            error!(error = %truncate_err, "Could not roll back partial append");
        }
        return Err(e);
    }
    Ok(())
}

/// Tabs and line breaks would corrupt the line-oriented logs
fn single_line(text: &str) -> String {
    text.replace(['\t', '\r', '\n'], " ")
}
