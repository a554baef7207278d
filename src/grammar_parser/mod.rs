//! Reader for the rule-file format.
//!
//! One production per line: `LHS -> RHS1 RHS2 …` with whitespace-separated
//! symbols, an optional leading `N. ` numbering that is stripped, `#`
//! comment lines, single-quoted literal tokens and an empty right-hand side
//! for epsilon. Lines without an arrow are skipped during file reading.

#[cfg(test)]
mod tests_rejections;

use chumsky::prelude::*;
use chumsky::text::inline_whitespace;
use thiserror::Error;

/// A right-hand-side entry as written in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RhsSymbol {
    /// Bare grammar symbol.
    Symbol(String),
    /// Single-quoted terminal token, quotes stripped.
    Literal(String),
}

/// One parsed rule line; the numbering is kept for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLine {
    pub number: Option<u64>,
    pub lhs: String,
    pub rhs: Vec<RhsSymbol>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct GrammarFileError {
    pub line: usize,
    pub message: String,
}

/// Parse a whole rule file. Comment lines, blank lines and lines without an
/// arrow are skipped; anything else must be a well-formed rule line.
pub fn read_rules(text: &str) -> Result<Vec<RuleLine>, GrammarFileError> {
    let mut rules = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || !line.contains("->") {
            continue;
        }
        let result = rule_line().parse(line);
        if result.has_errors() {
            let message = result
                .errors()
                .map(|error| format!("{error} at {}", error.span()))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(GrammarFileError {
                line: index + 1,
                message,
            });
        }
        if let Some(rule) = result.output() {
            rules.push(rule.clone());
        }
    }
    Ok(rules)
}

fn rule_line<'src>() -> impl Parser<'src, &'src str, RuleLine, extra::Err<Rich<'src, char>>> {
    number()
        .or_not()
        .then(bare_symbol().padded_by(inline_whitespace()))
        .then_ignore(just("->"))
        .then(
            symbol_entry()
                .padded_by(inline_whitespace())
                .repeated()
                .collect(),
        )
        .then_ignore(inline_whitespace())
        .then_ignore(end())
        .map(|((number, lhs), rhs)| RuleLine { number, lhs, rhs })
        .labelled("rule line")
}

fn number<'src>() -> impl Parser<'src, &'src str, u64, extra::Err<Rich<'src, char>>> {
    text::digits(10)
        .to_slice()
        .try_map(|digits: &str, span| {
            digits
                .parse::<u64>()
                .map_err(|error| Rich::custom(span, format!("invalid rule number: {error}")))
        })
        .then_ignore(just('.'))
        .then_ignore(inline_whitespace())
        .labelled("rule number")
}

fn symbol_entry<'src>() -> impl Parser<'src, &'src str, RhsSymbol, extra::Err<Rich<'src, char>>> {
    choice((
        quoted_literal().map(RhsSymbol::Literal),
        bare_symbol().map(RhsSymbol::Symbol),
    ))
}

fn bare_symbol<'src>() -> impl Parser<'src, &'src str, String, extra::Err<Rich<'src, char>>> {
    any()
        .filter(|c: &char| !c.is_whitespace() && *c != '\'')
        .repeated()
        .at_least(1)
        .to_slice()
        .map(str::to_string)
        .labelled("symbol")
}

fn quoted_literal<'src>() -> impl Parser<'src, &'src str, String, extra::Err<Rich<'src, char>>> {
    just('\'')
        .ignore_then(
            any()
                .filter(|c: &char| *c != '\'')
                .repeated()
                .at_least(1)
                .to_slice(),
        )
        .then_ignore(just('\''))
        .map(str::to_string)
        .labelled("quoted literal")
}
