//! fcg-enrich library interface
//!
//! Enriches a French wordlist with dictionary metadata (grammatical function,
//! definition link, homograph count) looked up on the Académie française
//! dictionary, producing a results table plus not-found and error logs.
//!
//! Pipeline: `loader` → `pipeline` (concurrent `enricher` calls over a
//! `lookup` client) → single `writer` consumer → results CSV.

pub mod enricher;
pub mod loader;
pub mod lookup;
pub mod pipeline;
pub mod schema;
pub mod settings;
pub mod types;
pub mod writer;

pub use crate::enricher::{EnrichError, Enricher};
pub use crate::lookup::{AcademieClient, DictionaryLookup, LookupError};
pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineError};
pub use crate::settings::Settings;
pub use crate::types::{DictionaryCandidate, EnrichedRow, InputRecord, Outcome, RunSummary};
pub use crate::writer::{BatchWriter, OutputPaths, WriteError};
