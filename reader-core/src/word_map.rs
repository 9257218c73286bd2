//! Word mapping lookup for sight-word annotations.
//!
//! The table maps a word to an opaque annotation (the shipped table uses
//! grapheme/phoneme pairs). It is loaded once at startup and only read
//! afterwards.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;

/// Errors from loading or building a word mapping table.
#[derive(Debug, Error)]
pub enum WordMapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Word mapping table must be a JSON object")]
    NotAnObject,

    #[error("Line {line}: {reason}")]
    Dictionary { line: usize, reason: String },
}

/// Read-only word → annotation table.
#[derive(Debug, Clone, Default)]
pub struct WordMappings {
    entries: HashMap<String, Value>,
}

impl WordMappings {
    /// Load the table from a JSON object file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WordMapError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse the table from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, WordMapError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(map) => Ok(Self::from_map(map)),
            _ => Err(WordMapError::NotAnObject),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Annotations for every known word appearing in `sentences`.
    ///
    /// Tokens are split on whitespace and stripped down to ASCII letters.
    /// A token is looked up as written, then lowercased; the result is keyed
    /// by the stripped token with its original casing.
    pub fn relevant_mappings<S: AsRef<str>>(&self, sentences: &[S]) -> BTreeMap<String, Value> {
        let mut relevant = BTreeMap::new();

        for token in sentences
            .iter()
            .flat_map(|sentence| sentence.as_ref().split_whitespace())
        {
            let word: String = token.chars().filter(char::is_ascii_alphabetic).collect();
            if word.is_empty() || relevant.contains_key(&word) {
                continue;
            }

            let annotation = self
                .entries
                .get(&word)
                .or_else(|| self.entries.get(&word.to_lowercase()));
            if let Some(annotation) = annotation {
                relevant.insert(word, annotation.clone());
            }
        }

        relevant
    }
}

// ============================================================================
// Phonics dictionary extraction
// ============================================================================

/// One grapheme and the phoneme it spells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonemeMapping {
    pub grapheme: String,
    pub phoneme: String,
}

const WORD_COLUMN: usize = 0;
const PAIRS_COLUMN: usize = 3;

/// Build a word mapping table from a tab-separated phonics dictionary.
///
/// Column 0 holds the word and column 3 a comma-separated list of
/// `grapheme-phoneme` pairs. Words without any pairs are left out.
pub fn parse_phonics_dictionary(
    reader: impl BufRead,
) -> Result<BTreeMap<String, Vec<PhonemeMapping>>, WordMapError> {
    let mut mappings = BTreeMap::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() <= PAIRS_COLUMN {
            return Err(WordMapError::Dictionary {
                line: line_number,
                reason: format!("expected at least {} columns", PAIRS_COLUMN + 1),
            });
        }

        let mut pairs = Vec::new();
        for pair in columns[PAIRS_COLUMN].split(',') {
            if pair.is_empty() || pair == "NULL" {
                continue;
            }
            let (grapheme, phoneme) =
                pair.split_once('-')
                    .ok_or_else(|| WordMapError::Dictionary {
                        line: line_number,
                        reason: format!("malformed pair {pair:?}"),
                    })?;
            pairs.push(PhonemeMapping {
                grapheme: grapheme.to_string(),
                phoneme: phoneme.to_string(),
            });
        }

        if !pairs.is_empty() {
            mappings.insert(columns[WORD_COLUMN].to_string(), pairs);
        }
    }

    Ok(mappings)
}
