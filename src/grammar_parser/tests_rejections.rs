use crate::grammar_parser::read_rules;

#[test]
fn unterminated_literal_is_an_error() {
    let err = read_rules("A -> 'John B").unwrap_err();
    assert_eq!(err.line, 1);
}

#[test]
fn empty_literal_is_an_error() {
    assert!(read_rules("A -> ''").is_err());
}

#[test]
fn error_reports_the_offending_line() {
    let text = "\
# fine
START -> NP
NP -> 'the N
";
    let err = read_rules(text).unwrap_err();
    assert_eq!(err.line, 3);
    assert!(!err.message.is_empty());
}

#[test]
fn later_lines_do_not_mask_an_early_error() {
    let text = "\
A -> 'oops
B -> C
";
    assert!(read_rules(text).is_err());
}
