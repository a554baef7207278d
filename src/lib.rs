//! Earley chart parsing over lexicalized context-free grammars, with a
//! shared packed parse forest behind every accepted sentence.
//!
//! The chart is driven Stolcke-style: completions drain in decreasing order
//! of start column, predecessors that arrive after their reductor are
//! advanced by spontaneous dot shift, and completed items sharing
//! `(lhs, start, end)` pack into a single span so that exponentially
//! ambiguous inputs stay polynomial to recognize and to count.

use std::path::Path;

use thiserror::Error;

mod agenda;
mod chart;
mod conversion;
mod forest;
pub mod grammar;
pub mod grammar_parser;
#[cfg(test)]
mod mock_values;
pub mod parser;
pub mod vocabulary;

pub use grammar::{Grammar, GrammarError, Rule};
pub use grammar_parser::GrammarFileError;
pub use parser::{GenerateError, Recognition, SentenceParser, MAX_COMPLETED_STATES};
pub use vocabulary::{Vocabulary, VocabularyError};

#[derive(Debug, Error)]
pub enum EarlexError {
    #[error("could not read input file: {0}")]
    Io(#[from] std::io::Error),
    #[error("error while reading the grammar: {0}")]
    GrammarFile(#[from] GrammarFileError),
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),
    #[error("vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),
    #[error("generation overflow: {0}")]
    Generate(#[from] GenerateError),
}

/// A grammar plus its vocabulary, ready to parse sentences.
#[derive(Debug)]
pub struct Earlex {
    grammar: Grammar,
    vocabulary: Vocabulary,
}

impl Earlex {
    /// Build from grammar rule text and vocabulary JSON.
    pub fn from_sources(grammar_text: &str, vocabulary_json: &str) -> Result<Self, EarlexError> {
        let vocabulary = Vocabulary::from_json(vocabulary_json)?;
        let lines = grammar_parser::read_rules(grammar_text)?;
        let rules = lines
            .iter()
            .map(Rule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let grammar = Grammar::build(rules, &vocabulary.parts_of_speech())?;
        Ok(Earlex {
            grammar,
            vocabulary,
        })
    }

    pub fn from_files(
        grammar_path: impl AsRef<Path>,
        vocabulary_path: impl AsRef<Path>,
    ) -> Result<Self, EarlexError> {
        let grammar_text = std::fs::read_to_string(grammar_path)?;
        let vocabulary_json = std::fs::read_to_string(vocabulary_path)?;
        Self::from_sources(&grammar_text, &vocabulary_json)
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// A parser over a whitespace-tokenized sentence. `max_words` only
    /// matters for generator mode.
    pub fn parser_for(&self, sentence: &str, max_words: usize) -> SentenceParser {
        let tokens = sentence.split_whitespace().map(str::to_string).collect();
        SentenceParser::new(self.grammar.clone(), &self.vocabulary, tokens, max_words)
    }
}

#[cfg(test)]
mod facade_tests {
    use super::*;
    use crate::mock_values::{SAMPLE_GRAMMAR, SAMPLE_VOCAB_JSON};

    #[test]
    fn end_to_end_from_sources() {
        let engine = Earlex::from_sources(SAMPLE_GRAMMAR, SAMPLE_VOCAB_JSON).unwrap();
        let mut parser = engine.parser_for("john saw mary", 0);
        let outcome = parser.parse_sentence();
        assert!(outcome.accepted);
        assert_eq!(outcome.derivation_indicator, 1);
    }

    #[test]
    fn tokens_keep_their_spelling_but_scan_case_insensitively() {
        let engine = Earlex::from_sources(SAMPLE_GRAMMAR, SAMPLE_VOCAB_JSON).unwrap();
        let mut parser = engine.parser_for("John saw Mary", 0);
        assert!(parser.parse_sentence().accepted);
        let trees = parser.formatted_strings(0, false);
        assert_eq!(trees.len(), 1);
        assert!(trees[0].contains("(PN John)"), "{trees:?}");
    }

    #[test]
    fn grammar_errors_surface_at_load() {
        let err = Earlex::from_sources("NP -> D N\n", SAMPLE_VOCAB_JSON).unwrap_err();
        assert!(matches!(
            err,
            EarlexError::Grammar(GrammarError::StartRuleCount(0))
        ));
    }

    #[test]
    fn vocabulary_errors_surface_at_load() {
        let err = Earlex::from_sources(SAMPLE_GRAMMAR, "{}").unwrap_err();
        assert!(matches!(err, EarlexError::Vocabulary(_)));
    }
}
