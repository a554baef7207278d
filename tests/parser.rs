//! End-to-end scenarios against the public API.

use earlex::{Earlex, GenerateError};

const VOCAB: &str = r#"{
  "POSWithPossibleWords": {
    "D": ["the"],
    "N": ["boy", "telescope"],
    "V1": ["saw"],
    "P": ["with"],
    "PN": ["john", "mary"]
  }
}"#;

const GRAMMAR: &str = "\
# PP attachment is ambiguous under this grammar
1. START -> NP VP
2. NP -> D N
3. NP -> PN
4. NP -> NP PP
5. VP -> V1 NP
6. VP -> VP PP
7. PP -> P NP
";

// Same grammar without `NP -> PN`; proper nouns no longer parse.
const GRAMMAR_NO_PN: &str = "\
START -> NP VP
NP -> D N
NP -> NP PP
VP -> V1 NP
VP -> VP PP
PP -> P NP
";

fn engine(grammar: &str) -> Earlex {
    Earlex::from_sources(grammar, VOCAB).expect("engine builds")
}

#[test]
fn s1_simple_sentence() {
    let engine = engine(GRAMMAR);
    let mut parser = engine.parser_for("john saw mary", 0);
    let outcome = parser.parse_sentence();
    assert!(outcome.accepted);
    assert_eq!(outcome.derivation_indicator, 1);
    assert!(parser.has_derivation());
    assert_eq!(parser.count_derivations(), 1);
    assert_eq!(
        parser.formatted_strings(0, false),
        vec!["(START (NP (PN john)) (VP (V1 saw) (NP (PN mary))))".to_string()]
    );
    assert_eq!(
        parser.formatted_strings(0, true),
        vec!["PN V1 PN".to_string()]
    );
}

#[test]
fn s2_pp_attachment_is_doubly_ambiguous() {
    let engine = engine(GRAMMAR);
    let mut parser = engine.parser_for("the boy saw the boy with the telescope", 0);
    let outcome = parser.parse_sentence();
    assert!(outcome.accepted);
    assert_eq!(parser.count_derivations(), 2);

    let trees = parser.formatted_strings(0, false);
    let mut expected = vec![
        // The prepositional phrase attaches to the object noun phrase…
        "(START (NP (D the) (N boy)) (VP (V1 saw) (NP (NP (D the) (N boy)) \
         (PP (P with) (NP (D the) (N telescope))))))"
            .to_string(),
        // …or to the verb phrase.
        "(START (NP (D the) (N boy)) (VP (VP (V1 saw) (NP (D the) (N boy))) \
         (PP (P with) (NP (D the) (N telescope)))))"
            .to_string(),
    ];
    expected.sort();
    assert_eq!(trees, expected);

    // Both derivations share one part-of-speech yield.
    assert_eq!(
        parser.formatted_strings(0, true),
        vec!["D N V1 D N P D N".to_string()]
    );
}

#[test]
fn s3_fragment_is_rejected() {
    let engine = engine(GRAMMAR);
    let mut parser = engine.parser_for("saw", 0);
    let outcome = parser.parse_sentence();
    assert!(!outcome.accepted);
    assert_eq!(outcome.derivation_indicator, 0);
    assert_eq!(parser.count_derivations(), 0);
    assert!(parser.formatted_strings(0, false).is_empty());
}

#[test]
fn s4_unit_cycle_terminates_with_one_derivation() {
    let cyclic = "\
START -> A
A -> B
B -> A
A -> 'x'
";
    let engine = engine(cyclic);
    let mut parser = engine.parser_for("x", 0);
    let outcome = parser.parse_sentence();
    assert!(outcome.accepted);
    assert_eq!(outcome.derivation_indicator, 1);
    assert_eq!(parser.count_derivations(), 1);
    assert_eq!(
        parser.formatted_strings(0, false),
        vec!["(START (A x))".to_string()]
    );
}

#[test]
fn s5_completion_fan_out_beyond_the_cap_rejects() {
    // A unit chain completes once per link in the token's column.
    let mut text = String::from("START -> A0\n");
    for link in 0..60 {
        text.push_str(&format!("A{link} -> A{}\n", link + 1));
    }
    text.push_str("A60 -> 'x'\n");
    let engine = engine(&text);

    let mut parser = engine.parser_for("x", 0);
    parser.set_completed_cap(30);
    let outcome = parser.parse_sentence();
    assert!(!outcome.accepted);
    assert_eq!(outcome.derivation_indicator, 0);
    assert_eq!(parser.count_derivations(), 0);

    // The rejection left no residue: a rerun with a generous cap succeeds.
    parser.set_completed_cap(earlex::MAX_COMPLETED_STATES);
    let outcome = parser.parse_sentence();
    assert!(outcome.accepted);
    assert_eq!(outcome.derivation_indicator, 1);
}

#[test]
fn s6_reparse_swaps_grammars_and_reproduces_results() {
    let first = engine(GRAMMAR);
    let second = engine(GRAMMAR_NO_PN);

    let mut parser = first.parser_for("john saw mary", 0);
    let initial = parser.parse_sentence();
    assert!(initial.accepted);
    let initial_count = parser.count_derivations();
    let initial_trees = parser.formatted_strings(0, false);

    let without_pn = parser.reparse(second.grammar().clone());
    assert!(!without_pn.accepted);
    assert_eq!(without_pn.derivation_indicator, 0);
    assert_eq!(parser.count_derivations(), 0);

    let restored = parser.reparse(first.grammar().clone());
    assert_eq!(restored, initial);
    assert_eq!(parser.count_derivations(), initial_count);
    assert_eq!(parser.formatted_strings(0, false), initial_trees);
}

#[test]
fn generator_produces_yields_up_to_the_window() {
    let engine = engine(GRAMMAR);
    let mut parser = engine.parser_for("", 3);
    parser.generate_sentence().expect("generation fits the cap");
    // Shortest sentence shape: NP VP with pronoun subject and object.
    let yields = parser.formatted_strings(3, true);
    assert!(
        yields.contains(&"PN V1 PN".to_string()),
        "missing PN V1 PN in {yields:?}"
    );
    // Nothing derivable in fewer than three words under this grammar.
    assert!(parser.formatted_strings(1, true).is_empty());
    assert!(parser.formatted_strings(2, true).is_empty());
}

#[test]
fn generator_overflow_is_fatal() {
    let explosive = "\
START -> A
A -> A A
A -> D
";
    let engine = engine(explosive);
    let mut parser = engine.parser_for("", 16);
    parser.set_completed_cap(50);
    match parser.generate_sentence() {
        Err(GenerateError::TooManyItems { length, count }) => {
            assert!(length <= 16);
            assert!(count > 100);
        }
        other => panic!("expected TooManyItems, got {other:?}"),
    }
}
