//! Results table schema
//!
//! The header and every data row are produced from `COLUMNS`, so the two
//! cannot drift apart.

use crate::types::EnrichedRow;

/// Results table column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Frequency,
    Lemma,
    GrammaticalFunction,
    HomographNumber,
    DefinitionUrl,
    SoundUrl,
    Homograph,
}

/// Column order of the results table
pub const COLUMNS: [Column; 7] = [
    Column::Frequency,
    Column::Lemma,
    Column::GrammaticalFunction,
    Column::HomographNumber,
    Column::DefinitionUrl,
    Column::SoundUrl,
    Column::Homograph,
];

impl Column {
    /// Header title
    pub fn title(self) -> &'static str {
        match self {
            Column::Frequency => "Frequency",
            Column::Lemma => "Lemma",
            Column::GrammaticalFunction => "Grammatical Function",
            Column::HomographNumber => "Homograph Number",
            Column::DefinitionUrl => "Definition URL",
            Column::SoundUrl => "Sound URL",
            Column::Homograph => "Homograph",
        }
    }

    /// Cell value for `row`
    pub fn value(self, row: &EnrichedRow) -> String {
        match self {
            Column::Frequency => row.frequency.to_string(),
            Column::Lemma => row.lemma.clone(),
            Column::GrammaticalFunction => row.grammatical_function.clone(),
            Column::HomographNumber => row.homograph_rank.to_string(),
            Column::DefinitionUrl => row.definition_url.clone(),
            Column::SoundUrl => row.sound_url.clone(),
            Column::Homograph => row.has_homographs.to_string(),
        }
    }
}

/// Header record
pub fn header() -> Vec<&'static str> {
    COLUMNS.iter().map(|c| c.title()).collect()
}

/// Data record for `row`, in header order
pub fn record(row: &EnrichedRow) -> Vec<String> {
    COLUMNS.iter().map(|c| c.value(row)).collect()
}
