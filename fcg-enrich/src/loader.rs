//! Wordlist loading
//!
//! Reads the spreadsheet CSV export of the frequency wordlist. The export has
//! a title line above the column header, so data starts on the third line.
//! Columns, in order: Frequency, Lemma, Audio Link, Definition, Context.
//! Anything after the fifth column is ignored.

use crate::types::InputRecord;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Lines before the first data row (title + column header)
const HEADER_LINES: usize = 2;

/// Wordlist loading errors
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot open wordlist {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Load the wordlist at `path`
pub fn load_wordlist(path: &Path) -> Result<Vec<InputRecord>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let records = read_wordlist(file)?;
    info!(
        path = %path.display(),
        records = records.len(),
        "Wordlist loaded"
    );
    Ok(records)
}

/// Parse wordlist CSV from any reader
///
/// Rows that fail CSV decoding or whose frequency is not a number are
/// skipped with a warning. Blank rows are skipped silently. Short rows are
/// padded with empty fields.
pub fn read_wordlist<R: Read>(reader: R) -> Result<Vec<InputRecord>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (index, result) in csv_reader.records().enumerate() {
        if index < HEADER_LINES {
            continue;
        }

        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(LoadError::Csv(e)),
            Err(e) => {
                warn!(record = index + 1, error = %e, "Skipping unreadable wordlist row");
                skipped += 1;
                continue;
            }
        };

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 1);

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let field = |i: usize| record.get(i).unwrap_or("").to_string();

        let frequency = match field(0).trim().parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                warn!(
                    line,
                    frequency = %field(0),
                    "Skipping wordlist row with invalid frequency"
                );
                skipped += 1;
                continue;
            }
        };

        records.push(InputRecord {
            row: line,
            frequency,
            lemma: field(1),
            audio_link: field(2),
            definition: field(3),
            context: field(4),
        });
    }

    if skipped > 0 {
        debug!(skipped, "Wordlist rows skipped");
    }

    Ok(records)
}
