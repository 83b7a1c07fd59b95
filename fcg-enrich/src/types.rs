//! Core data types shared across the enrichment pipeline

/// One row of the source wordlist
///
/// Only `frequency` and `lemma` drive the enrichment. The remaining columns
/// are carried for completeness and never written to the results table.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    /// 1-based line number in the source file (for logs and the error log)
    pub row: usize,
    pub frequency: f64,
    pub lemma: String,
    pub audio_link: String,
    pub definition: String,
    pub context: String,
}

impl InputRecord {
    /// Build a record with only the fields the pipeline uses
    pub fn new(row: usize, frequency: f64, lemma: impl Into<String>) -> Self {
        Self {
            row,
            frequency,
            lemma: lemma.into(),
            audio_link: String::new(),
            definition: String::new(),
            context: String::new(),
        }
    }

    /// Label identifying this record in the not-found and error logs
    ///
    /// The trimmed lemma, or `row <n>` when the lemma is blank.
    pub fn label(&self) -> String {
        let lemma = self.lemma.trim();
        if lemma.is_empty() {
            format!("row {}", self.row)
        } else {
            lemma.to_string()
        }
    }
}

/// Exact-match dictionary entry returned by a lookup
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryCandidate {
    /// Definition page URL (one per meaning of the word)
    pub url: String,
    /// Headword as spelled by the dictionary
    pub label: String,
    /// Similarity score as sent by the service ("1.0" for exact matches)
    pub score: String,
    /// Grammatical function ("nom", "verbe", ...)
    pub grammatical_function: String,
    /// Homograph rank, most common meaning first
    pub homograph_rank: u32,
}

/// Result row written to the results table
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub frequency: f64,
    pub lemma: String,
    pub grammatical_function: String,
    pub homograph_rank: u32,
    pub definition_url: String,
    pub sound_url: String,
    /// True when the word has more than one exact-match entry
    pub has_homographs: bool,
}

/// Outcome of enriching one record
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// One row per exact-match dictionary entry
    Found(Vec<EnrichedRow>),
    /// No exact match; the word goes to the not-found log
    NotFound,
}

/// Counters reported at the end of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records that completed (any outcome)
    pub processed: usize,
    /// Records with at least one exact match
    pub found: usize,
    /// Rows durably appended to the results table
    pub rows_written: usize,
    /// Records routed to the not-found log
    pub not_found: usize,
    /// Records routed to the error log
    pub errors: usize,
    /// Successful flushes that wrote at least one row
    pub flushes: usize,
    /// Flush attempts that failed (rows kept for retry)
    pub failed_flushes: usize,
    /// Not-found or error log lines that could not be written
    pub log_write_failures: usize,
}
