//! Production rules and the reachability-closed grammar.
//!
//! Construction renames every author-written nonterminal to a fresh `Xk`
//! (parts of speech are preserved) and introduces a dedicated bridge rule
//! `Xk -> POS` for every part of speech used on a right-hand side, so that
//! scanning is uniform: a part of speech is only ever introduced by its one
//! bridge rule. The original spellings are kept in a name-origin table for
//! forest output.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Start symbol. Exactly one rule has it as lhs and it never appears on a
/// right-hand side.
pub const START: &str = "START";
/// Synthetic outer symbol of the seed rule `Gamma -> START`.
pub const GAMMA: &str = "Gamma";
/// Printed in place of an empty right-hand side.
pub const EPSILON: &str = "Epsilon";
/// Right-hand side of the scanned part-of-speech rules; stands for whatever
/// token the scan consumed.
pub const WILDCARD: &str = "*";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("missing `->` in rule: {0}")]
    MissingArrow(String),
    #[error("a quoted literal may not follow a nonterminal: {0}")]
    LiteralAfterNonterminal(String),
    #[error("expected exactly one START rule, found {0}")]
    StartRuleCount(usize),
    #[error("START may not appear on a right-hand side: {0}")]
    StartOnRhs(String),
    #[error("unknown right-hand-side symbol `{0}` in `{1}`")]
    UnknownSymbol(String, String),
}

/// True for a symbol written as a single-quoted literal token.
pub fn is_literal(symbol: &str) -> bool {
    symbol.len() >= 3 && symbol.starts_with('\'') && symbol.ends_with('\'')
}

/// The token text of a quoted literal symbol.
pub fn literal_text(symbol: &str) -> &str {
    &symbol[1..symbol.len() - 1]
}

/// An immutable production. Quoted literals keep their quotes so that
/// literalness is recoverable from the symbol alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub lhs: String,
    pub rhs: Vec<String>,
    /// True iff the rhs begins with one or more quoted literals.
    pub lexical: bool,
}

impl Rule {
    pub fn new(lhs: impl Into<String>, rhs: Vec<String>) -> Result<Self, GrammarError> {
        let lhs = lhs.into();
        let mut past_literals = false;
        for symbol in &rhs {
            if is_literal(symbol) {
                if past_literals {
                    return Err(GrammarError::LiteralAfterNonterminal(format!(
                        "{} -> {}",
                        lhs,
                        rhs.join(" ")
                    )));
                }
            } else {
                past_literals = true;
            }
        }
        let lexical = rhs.first().map_or(false, |s| is_literal(s));
        Ok(Rule { lhs, rhs, lexical })
    }

    /// Parse a single `LHS -> RHS…` line. Unlike the file reader, a missing
    /// arrow here is a hard error.
    pub fn from_line(line: &str) -> Result<Self, GrammarError> {
        let (lhs, rhs) = line
            .split_once("->")
            .ok_or_else(|| GrammarError::MissingArrow(line.to_string()))?;
        let rhs = rhs.split_whitespace().map(str::to_string).collect();
        Rule::new(lhs.trim(), rhs)
    }

    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }

    /// Number of leading quoted literals.
    pub fn literal_prefix_len(&self) -> usize {
        self.rhs.iter().take_while(|s| is_literal(s)).count()
    }

    /// The scanned wildcard rules `POS -> *` are recognized by shape.
    pub fn is_scanned(&self) -> bool {
        self.rhs.len() == 1 && self.rhs[0] == WILDCARD
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rhs.is_empty() {
            write!(f, "{} -> {}", self.lhs, EPSILON)
        } else {
            write!(f, "{} -> {}", self.lhs, self.rhs.join(" "))
        }
    }
}

/// Where a grammar-internal nonterminal name came from. Forest output uses
/// this to print the author's spelling and to hide the POS bridges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameOrigin {
    Renamed(String),
    PosBridge,
}

/// Indexed rule set restricted to rules reachable from `START`, plus the
/// schematic list of every rule as inserted.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    rules: HashMap<String, Vec<Arc<Rule>>>,
    schematic: Vec<Arc<Rule>>,
    reachable: HashSet<String>,
    names: HashMap<String, NameOrigin>,
    pos: HashSet<String>,
}

impl Grammar {
    /// Build a grammar from rules as written: validates the START
    /// discipline, renames nonterminals, bridges parts of speech and closes
    /// the rule map under reachability from START.
    pub fn build(rules: Vec<Rule>, pos: &HashSet<String>) -> Result<Self, GrammarError> {
        let start_rules = rules.iter().filter(|r| r.lhs == START).count();
        if start_rules != 1 {
            return Err(GrammarError::StartRuleCount(start_rules));
        }
        if let Some(rule) = rules.iter().find(|r| r.rhs.iter().any(|s| s == START)) {
            return Err(GrammarError::StartOnRhs(rule.to_string()));
        }

        let mut names: HashMap<String, NameOrigin> = HashMap::new();
        let mut renames: HashMap<String, String> = HashMap::new();
        let mut fresh = 0usize;
        let mut rename = |symbol: &str| -> String {
            if symbol == START || is_literal(symbol) || pos.contains(symbol) {
                return symbol.to_string();
            }
            renames
                .entry(symbol.to_string())
                .or_insert_with(|| {
                    fresh += 1;
                    let name = format!("X{fresh}");
                    names.insert(name.clone(), NameOrigin::Renamed(symbol.to_string()));
                    name
                })
                .clone()
        };

        let mut renamed: Vec<Rule> = rules
            .iter()
            .map(|rule| Rule {
                lhs: rename(&rule.lhs),
                rhs: rule.rhs.iter().map(|s| rename(s)).collect(),
                lexical: rule.lexical,
            })
            .collect();
        drop(rename);

        // One bridge nonterminal per part of speech used on a rhs.
        let mut bridges: HashMap<String, String> = HashMap::new();
        let mut bridge_rules: Vec<Rule> = Vec::new();
        for rule in &mut renamed {
            for symbol in &mut rule.rhs {
                if !pos.contains(symbol.as_str()) {
                    continue;
                }
                let bridge = bridges.entry(symbol.clone()).or_insert_with(|| {
                    fresh += 1;
                    let name = format!("X{fresh}");
                    names.insert(name.clone(), NameOrigin::PosBridge);
                    bridge_rules.push(Rule {
                        lhs: name.clone(),
                        rhs: vec![symbol.clone()],
                        lexical: false,
                    });
                    name
                });
                *symbol = bridge.clone();
            }
        }

        let mut grammar = Grammar {
            names,
            pos: pos.clone(),
            ..Default::default()
        };
        for rule in renamed.into_iter().chain(bridge_rules) {
            grammar.insert(Arc::new(rule));
        }
        grammar.validate()?;
        Ok(grammar)
    }

    /// Add a rule to the schematic set and, when its lhs is reachable from
    /// START, admit it (and everything it newly reaches) into the rule map.
    pub fn insert(&mut self, rule: Arc<Rule>) {
        self.schematic.push(rule.clone());
        if rule.lhs == START || self.reachable.contains(&rule.lhs) {
            self.admit(rule);
        }
    }

    // Breadth-first closure over (schematic rule, lhs) pairs. A context-free
    // grammar realizes each pair as the rule itself; `realize` is the seam
    // for grammar classes that concretize a schematic rule per nonterminal.
    fn admit(&mut self, seed: Arc<Rule>) {
        let mut queue = VecDeque::from([(seed.clone(), seed.lhs.clone())]);
        while let Some((schematic, lhs)) = queue.pop_front() {
            let rule = self.realize(&schematic, &lhs);
            {
                let entry = self.rules.entry(lhs).or_default();
                if entry.contains(&rule) {
                    continue;
                }
                entry.push(rule.clone());
            }
            let expansions: Vec<String> = rule
                .rhs
                .iter()
                .filter(|s| !is_literal(s) && !self.pos.contains(s.as_str()))
                .cloned()
                .collect();
            for symbol in expansions {
                if self.reachable.insert(symbol.clone()) {
                    for candidate in self.schematic.clone() {
                        if candidate.lhs == symbol {
                            queue.push_back((candidate, symbol.clone()));
                        }
                    }
                }
            }
        }
    }

    fn realize(&self, schematic: &Arc<Rule>, _lhs: &str) -> Arc<Rule> {
        schematic.clone()
    }

    /// Reachable rules with the given lhs.
    pub fn rules_for(&self, lhs: &str) -> &[Arc<Rule>] {
        self.rules.get(lhs).map_or(&[], |rules| rules.as_slice())
    }

    /// Whether prediction can expand this symbol.
    pub fn can_expand(&self, symbol: &str) -> bool {
        self.rules.contains_key(symbol)
    }

    pub fn lexical_rules(&self) -> impl Iterator<Item = &Arc<Rule>> {
        self.rules.values().flatten().filter(|rule| rule.lexical)
    }

    /// Mark every nonterminal reachable from `start` through the rule map.
    pub fn dfs(&self, start: &str, visited: &mut HashSet<String>) {
        if !visited.insert(start.to_string()) {
            return;
        }
        for rule in self.rules_for(start) {
            for symbol in &rule.rhs {
                if !is_literal(symbol) && !self.pos.contains(symbol.as_str()) {
                    self.dfs(symbol, visited);
                }
            }
        }
    }

    /// The author-facing name for a grammar symbol, or `None` for the
    /// transparent POS bridge nonterminals.
    pub fn display_name<'a>(&'a self, symbol: &'a str) -> Option<&'a str> {
        match self.names.get(symbol) {
            Some(NameOrigin::Renamed(original)) => Some(original),
            Some(NameOrigin::PosBridge) => None,
            None => Some(symbol),
        }
    }

    // Every rhs symbol of a reachable rule must be a part of speech, a key
    // of the rule map, or a quoted literal.
    fn validate(&self) -> Result<(), GrammarError> {
        for rules in self.rules.values() {
            for rule in rules {
                for symbol in &rule.rhs {
                    if is_literal(symbol)
                        || self.pos.contains(symbol.as_str())
                        || self.rules.contains_key(symbol)
                    {
                        continue;
                    }
                    return Err(GrammarError::UnknownSymbol(
                        symbol.clone(),
                        rule.to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.rules.keys().collect();
        keys.sort();
        for key in keys {
            for rule in &self.rules[key] {
                writeln!(f, "{rule}")?;
            }
        }
        Ok(())
    }
}
