//! Dictionary entry models stored in the local word table.

use crate::text::fold_turkish;
use serde::{Deserialize, Serialize};

/// Usage example attached to a meaning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Example {
    pub sentence: String,
    #[serde(default)]
    pub author: Option<String>,
}

/// One sense of a word.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meaning {
    pub meaning: String,
    #[serde(default)]
    pub part_of_speech: Option<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub examples: Vec<Example>,
}

/// Denormalized dictionary entry keyed by word name.
///
/// Data files published to the object store are JSON arrays of this shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordRecord {
    pub name: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
    #[serde(default)]
    pub related_words: Vec<String>,
}

impl WordRecord {
    /// Build a bare entry with a single meaning.
    ///
    /// # Returns
    /// A [`WordRecord`] with no optional metadata.
    pub fn with_meaning(name: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phonetic: None,
            root: None,
            origin: None,
            attributes: Vec::new(),
            meanings: vec![Meaning {
                meaning: meaning.into(),
                part_of_speech: None,
                attributes: Vec::new(),
                examples: Vec::new(),
            }],
            related_words: Vec::new(),
        }
    }

    /// Folded lookup key for this entry.
    pub fn search_key(&self) -> String {
        fold_turkish(&self.name)
    }
}

/// Parse a data file body into word records.
///
/// Blank names are dropped; the remaining order is preserved.
///
/// # Errors
/// Returns a JSON error when the payload is not an array of word records.
pub fn parse_word_file(bytes: &[u8]) -> Result<Vec<WordRecord>, serde_json::Error> {
    let mut records: Vec<WordRecord> = serde_json::from_slice(bytes)?;
    records.retain(|record| !record.name.trim().is_empty());
    for record in &mut records {
        record.name = record.name.trim().to_string();
    }
    Ok(records)
}
