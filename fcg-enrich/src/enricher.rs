//! Row enrichment
//!
//! Turns one wordlist record into result rows using a dictionary lookup.
//! Performs no file I/O: routing outcomes to the results table, the
//! not-found log or the error log is the writer's job.

use crate::lookup::{DictionaryLookup, LookupError};
use crate::types::{EnrichedRow, InputRecord, Outcome};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Default sound link template, `{lemma}` is replaced by the word
pub const DEFAULT_SOUND_URL_TEMPLATE: &str = "https://forvo.com/word/{lemma}";

/// Placeholder substituted in the sound link template
pub const LEMMA_PLACEHOLDER: &str = "{lemma}";

/// Per-record enrichment failure
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Source row has no lemma; the service is not queried
    #[error("Row {row} has no lemma")]
    MissingLemma { row: usize },

    /// Dictionary lookup failed for this word
    #[error("Lookup failed for '{word}': {source}")]
    Lookup {
        word: String,
        #[source]
        source: LookupError,
    },
}

/// Enriches records against a dictionary source
pub struct Enricher {
    lookup: Arc<dyn DictionaryLookup>,
    sound_url_template: String,
}

impl Enricher {
    pub fn new(lookup: Arc<dyn DictionaryLookup>) -> Self {
        Self::with_sound_url_template(lookup, DEFAULT_SOUND_URL_TEMPLATE)
    }

    pub fn with_sound_url_template(
        lookup: Arc<dyn DictionaryLookup>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            lookup,
            sound_url_template: template.into(),
        }
    }

    /// Sound link for `lemma`
    ///
    /// Built from the template only; any audio link in the source row is ignored.
    pub fn sound_url(&self, lemma: &str) -> String {
        self.sound_url_template.replace(LEMMA_PLACEHOLDER, lemma)
    }

    /// Enrich a single record
    ///
    /// # Returns
    /// * `Outcome::Found` with one row per exact-match entry
    /// * `Outcome::NotFound` when the dictionary has no exact match
    ///
    /// # Errors
    /// * `EnrichError::MissingLemma` for rows with a blank lemma
    /// * `EnrichError::Lookup` when the dictionary request fails
    pub async fn enrich(&self, record: &InputRecord) -> Result<Outcome, EnrichError> {
        let lemma = record.lemma.trim();
        if lemma.is_empty() {
            return Err(EnrichError::MissingLemma { row: record.row });
        }

        let candidates = self
            .lookup
            .lookup(lemma)
            .await
            .map_err(|source| EnrichError::Lookup {
                word: lemma.to_string(),
                source,
            })?;

        if candidates.is_empty() {
            debug!(word = %lemma, row = record.row, "No exact match");
            return Ok(Outcome::NotFound);
        }

        let has_homographs = candidates.len() > 1;
        let sound_url = self.sound_url(lemma);

        let rows = candidates
            .into_iter()
            .map(|candidate| EnrichedRow {
                frequency: record.frequency,
                lemma: lemma.to_string(),
                grammatical_function: candidate.grammatical_function,
                homograph_rank: candidate.homograph_rank,
                definition_url: candidate.url,
                sound_url: sound_url.clone(),
                has_homographs,
            })
            .collect::<Vec<_>>();

        debug!(
            word = %lemma,
            row = record.row,
            entries = rows.len(),
            has_homographs,
            "Word enriched"
        );

        Ok(Outcome::Found(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DictionaryCandidate;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed number of exact matches and counts calls
    struct FixedLookup {
        matches: usize,
        calls: AtomicUsize,
    }

    impl FixedLookup {
        fn new(matches: usize) -> Arc<Self> {
            Arc::new(Self {
                matches,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DictionaryLookup for FixedLookup {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn lookup(&self, word: &str) -> Result<Vec<DictionaryCandidate>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((1..=self.matches)
                .map(|i| DictionaryCandidate {
                    url: format!("https://dict.test/{}/{}", word, i),
                    label: word.to_string(),
                    score: "1.0".to_string(),
                    grammatical_function: format!("fn{}", i),
                    homograph_rank: i as u32,
                })
                .collect())
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl DictionaryLookup for FailingLookup {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn lookup(&self, _word: &str) -> Result<Vec<DictionaryCandidate>, LookupError> {
            Err(LookupError::Api(503, "unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_single_match_has_no_homographs() {
        let enricher = Enricher::new(FixedLookup::new(1));
        let record = InputRecord::new(3, 100.0, "chat");

        let Outcome::Found(rows) = enricher.enrich(&record).await.unwrap() else {
            panic!("expected Found");
        };

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.frequency, 100.0);
        assert_eq!(row.lemma, "chat");
        assert_eq!(row.grammatical_function, "fn1");
        assert_eq!(row.homograph_rank, 1);
        assert_eq!(row.definition_url, "https://dict.test/chat/1");
        assert_eq!(row.sound_url, "https://forvo.com/word/chat");
        assert!(!row.has_homographs);
    }

    #[tokio::test]
    async fn test_multiple_matches_all_flagged() {
        let enricher = Enricher::new(FixedLookup::new(3));
        let record = InputRecord::new(4, 42.0, "livre");

        let Outcome::Found(rows) = enricher.enrich(&record).await.unwrap() else {
            panic!("expected Found");
        };

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.has_homographs));
        assert!(rows.iter().all(|r| r.frequency == 42.0));
        let ranks: Vec<u32> = rows.iter().map(|r| r.homograph_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_no_match_is_not_found() {
        let enricher = Enricher::new(FixedLookup::new(0));
        let record = InputRecord::new(5, 50.0, "xyzzy");

        assert_eq!(enricher.enrich(&record).await.unwrap(), Outcome::NotFound);
    }

    #[tokio::test]
    async fn test_blank_lemma_skips_lookup() {
        let lookup = FixedLookup::new(1);
        let enricher = Enricher::new(lookup.clone());
        let record = InputRecord::new(9, 1.0, "  ");

        let err = enricher.enrich(&record).await.unwrap_err();
        assert!(matches!(err, EnrichError::MissingLemma { row: 9 }));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_reported() {
        let enricher = Enricher::new(Arc::new(FailingLookup));
        let record = InputRecord::new(2, 1.0, "chien");

        let err = enricher.enrich(&record).await.unwrap_err();
        match err {
            EnrichError::Lookup { word, source } => {
                assert_eq!(word, "chien");
                assert!(matches!(source, LookupError::Api(503, _)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lemma_is_trimmed() {
        let enricher = Enricher::new(FixedLookup::new(1));
        let record = InputRecord::new(2, 1.0, " être ");

        let Outcome::Found(rows) = enricher.enrich(&record).await.unwrap() else {
            panic!("expected Found");
        };
        assert_eq!(rows[0].lemma, "être");
        assert_eq!(rows[0].sound_url, "https://forvo.com/word/être");
    }

    #[test]
    fn test_custom_sound_template() {
        let enricher =
            Enricher::with_sound_url_template(FixedLookup::new(1), "https://audio.test/{lemma}.mp3");
        assert_eq!(enricher.sound_url("chat"), "https://audio.test/chat.mp3");
    }
}
