//! Vocabulary loader and the process-wide scanning tables.
//!
//! The vocabulary JSON carries one required property,
//! `POSWithPossibleWords`, mapping each part-of-speech category to its
//! lowercase surface forms; the loader also builds the inverse
//! word-to-categories index. The part-of-speech identifier set and the
//! scanned wildcard rules (`POS -> *`) are installed once per process and
//! are read-only afterwards, so independent parsers can run in parallel
//! against the same tables.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use serde::Deserialize;
use thiserror::Error;

use crate::grammar::{Rule, WILDCARD};

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("could not read vocabulary file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed vocabulary JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct VocabularyFile {
    #[serde(rename = "POSWithPossibleWords")]
    pos_with_possible_words: HashMap<String, Vec<String>>,
}

/// Surface-form lexicon: part-of-speech categories and the words they
/// cover, indexed in both directions.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub pos_with_possible_words: HashMap<String, Vec<String>>,
    pub word_with_possible_pos: HashMap<String, Vec<String>>,
}

impl Vocabulary {
    pub fn from_json(text: &str) -> Result<Self, VocabularyError> {
        let raw: VocabularyFile = serde_json::from_str(text)?;
        let mut word_with_possible_pos: HashMap<String, Vec<String>> = HashMap::new();
        for (pos, words) in &raw.pos_with_possible_words {
            for word in words {
                word_with_possible_pos
                    .entry(word.clone())
                    .or_default()
                    .push(pos.clone());
            }
        }
        for categories in word_with_possible_pos.values_mut() {
            categories.sort();
        }
        Ok(Vocabulary {
            pos_with_possible_words: raw.pos_with_possible_words,
            word_with_possible_pos,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, VocabularyError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Part-of-speech categories for a surface token. Lookup lowercases the
    /// token; unknown words have no categories.
    pub fn pos_for(&self, word: &str) -> &[String] {
        self.word_with_possible_pos
            .get(word.to_lowercase().as_str())
            .map_or(&[], |categories| categories.as_slice())
    }

    pub fn parts_of_speech(&self) -> HashSet<String> {
        self.pos_with_possible_words.keys().cloned().collect()
    }
}

static PARTS_OF_SPEECH: OnceLock<HashSet<String>> = OnceLock::new();
static SCANNED_RULES: OnceLock<HashMap<String, Arc<Rule>>> = OnceLock::new();

/// Install the process-wide part-of-speech set and the scanned wildcard
/// rules from a vocabulary. The first installation wins and later calls are
/// no-ops, so every parser in the process scans against the same table.
pub fn install(vocabulary: &Vocabulary) {
    SCANNED_RULES.get_or_init(|| {
        vocabulary
            .parts_of_speech()
            .into_iter()
            .map(|pos| {
                let rule = Rule {
                    lhs: pos.clone(),
                    rhs: vec![WILDCARD.to_string()],
                    lexical: false,
                };
                (pos, Arc::new(rule))
            })
            .collect()
    });
    PARTS_OF_SPEECH.get_or_init(|| vocabulary.parts_of_speech());
}

/// The installed part-of-speech identifier set, if any vocabulary has been
/// installed yet.
pub fn parts_of_speech() -> Option<&'static HashSet<String>> {
    PARTS_OF_SPEECH.get()
}

/// The scanned wildcard rule for one part of speech.
pub(crate) fn scanned_rule(pos: &str) -> Option<&'static Arc<Rule>> {
    SCANNED_RULES.get().and_then(|table| table.get(pos))
}

/// Every installed scanned wildcard rule.
pub(crate) fn scanned_rules() -> impl Iterator<Item = &'static Arc<Rule>> {
    SCANNED_RULES.get().into_iter().flat_map(HashMap::values)
}
