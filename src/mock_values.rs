//! Shared test fixtures: the sample grammar and vocabulary used across the
//! unit tests.

use crate::grammar::{Grammar, Rule};
use crate::parser::SentenceParser;
use crate::vocabulary::Vocabulary;

pub const SAMPLE_VOCAB_JSON: &str = r#"{
  "POSWithPossibleWords": {
    "D": ["the"],
    "N": ["boy", "telescope"],
    "V1": ["saw"],
    "P": ["with"],
    "PN": ["john", "mary"]
  }
}"#;

pub const SAMPLE_GRAMMAR: &str = "\
# sample grammar with PP attachment ambiguity
1. START -> NP VP
2. NP -> D N
3. NP -> PN
4. NP -> NP PP
5. VP -> V1 NP
6. VP -> VP PP
7. PP -> P NP
";

pub fn sample_vocabulary() -> Vocabulary {
    Vocabulary::from_json(SAMPLE_VOCAB_JSON).expect("sample vocabulary parses")
}

pub fn grammar_from(text: &str) -> Grammar {
    let vocabulary = sample_vocabulary();
    let lines = crate::grammar_parser::read_rules(text).expect("grammar text parses");
    let rules = lines
        .iter()
        .map(Rule::try_from)
        .collect::<Result<Vec<_>, _>>()
        .expect("rules are well formed");
    Grammar::build(rules, &vocabulary.parts_of_speech()).expect("grammar builds")
}

pub fn sample_grammar() -> Grammar {
    grammar_from(SAMPLE_GRAMMAR)
}

pub fn parser_for(grammar_text: &str, sentence: &str) -> SentenceParser {
    let vocabulary = sample_vocabulary();
    let grammar = grammar_from(grammar_text);
    let tokens = sentence.split_whitespace().map(str::to_string).collect();
    SentenceParser::new(grammar, &vocabulary, tokens, 0)
}
