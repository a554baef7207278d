use crate::grammar::{GrammarError, Rule};
use crate::grammar_parser::{RhsSymbol, RuleLine};

// Quoted literals re-gain their quotes here: the core rule representation
// keeps them so literalness survives without a side table.
impl From<&RhsSymbol> for String {
    fn from(symbol: &RhsSymbol) -> Self {
        match symbol {
            RhsSymbol::Symbol(name) => name.clone(),
            RhsSymbol::Literal(text) => format!("'{text}'"),
        }
    }
}

impl TryFrom<&RuleLine> for Rule {
    type Error = GrammarError;

    fn try_from(line: &RuleLine) -> Result<Self, GrammarError> {
        Rule::new(
            line.lhs.clone(),
            line.rhs.iter().map(String::from).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar_parser::read_rules;

    #[test]
    fn rule_lines_convert_with_quotes_restored() {
        let lines = read_rules("A -> 'John' B").unwrap();
        let rule = Rule::try_from(&lines[0]).unwrap();
        assert_eq!(rule.lhs, "A");
        assert_eq!(rule.rhs, vec!["'John'".to_string(), "B".to_string()]);
        assert!(rule.lexical);
    }

    #[test]
    fn malformed_lexicality_surfaces_as_a_grammar_error() {
        let lines = read_rules("A -> B 'John'").unwrap();
        let err = Rule::try_from(&lines[0]).unwrap_err();
        assert!(matches!(err, GrammarError::LiteralAfterNonterminal(_)));
    }
}
