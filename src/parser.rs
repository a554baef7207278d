//! The parser driver: initialization, pre-scanning, the predict/complete
//! main loop, reparsing and generator mode.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::chart::{Chart, Item, ItemId, SpanId};
use crate::forest;
use crate::grammar::{literal_text, Grammar, Rule, GAMMA, START};
use crate::vocabulary::{self, Vocabulary};

/// Default per-column ceiling on completed states before a parse is
/// refused.
pub const MAX_COMPLETED_STATES: usize = 50_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("{count} derivations of length {length} exceed the generator cap")]
    TooManyItems { length: usize, count: u64 },
}

/// Outcome of a recognition run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recognition {
    pub accepted: bool,
    /// 1 when at least one finite derivation exists, else 0.
    pub derivation_indicator: u32,
}

impl Recognition {
    fn rejected() -> Self {
        Recognition {
            accepted: false,
            derivation_indicator: 0,
        }
    }
}

// Cached pre-scanned terminal: enough to re-install the completed
// part-of-speech item on every reset without consulting the vocabulary
// again.
#[derive(Debug, Clone)]
struct ScannedEntry {
    column: usize,
    rule: Arc<Rule>,
}

/// An Earley parser over a fixed token sequence. The chart is rebuilt on
/// every run, so `parse_sentence` and `reparse` can be called any number of
/// times and a repeated run reproduces its result exactly.
pub struct SentenceParser {
    grammar: Grammar,
    chart: Chart,
    tokens: Vec<String>,
    max_words: usize,
    completed_cap: usize,
    scanned: Vec<ScannedEntry>,
    gamma: Arc<Rule>,
    generator_chart: bool,
}

impl SentenceParser {
    /// Build a parser over a token sequence. The vocabulary is consulted
    /// once here to pre-scan every token into completed part-of-speech
    /// items; reparses restore them from the cache.
    pub fn new(
        grammar: Grammar,
        vocabulary: &Vocabulary,
        tokens: Vec<String>,
        max_words: usize,
    ) -> Self {
        vocabulary::install(vocabulary);
        let scanned = tokens
            .iter()
            .enumerate()
            .flat_map(|(column, token)| {
                vocabulary.pos_for(token).iter().filter_map(move |pos| {
                    vocabulary::scanned_rule(pos).map(|rule| ScannedEntry {
                        column,
                        rule: rule.clone(),
                    })
                })
            })
            .collect();
        let chart = Chart::over_tokens(&tokens);
        let gamma = Arc::new(Rule {
            lhs: GAMMA.to_string(),
            rhs: vec![START.to_string()],
            lexical: false,
        });
        SentenceParser {
            grammar,
            chart,
            tokens,
            max_words,
            completed_cap: MAX_COMPLETED_STATES,
            scanned,
            gamma,
            generator_chart: false,
        }
    }

    /// Adjust the per-column completed-state ceiling.
    pub fn set_completed_cap(&mut self, cap: usize) {
        self.completed_cap = cap;
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn parse_sentence(&mut self) -> Recognition {
        if self.generator_chart || self.chart.columns.len() != self.tokens.len() + 1 {
            self.chart = Chart::over_tokens(&self.tokens);
            self.generator_chart = false;
        } else {
            self.chart.reset();
        }
        self.install();
        self.run()
    }

    /// Reparse the same input under a different grammar. Pre-scanned
    /// terminals come from the cache rather than a rescan; the lexical pass
    /// reruns because it depends on the grammar.
    pub fn reparse(&mut self, grammar: Grammar) -> Recognition {
        self.grammar = grammar;
        self.parse_sentence()
    }

    /// Drive the grammar generatively over `max_words` positions: every
    /// part of speech is treated as scannable anywhere, lexical rules anchor
    /// at every position, and the derivation count per length is watched so
    /// runaway ambiguity aborts early.
    pub fn generate_sentence(&mut self) -> Result<(), GenerateError> {
        self.chart = Chart::over_positions(self.max_words);
        self.generator_chart = true;
        let wildcard_rules: Vec<Arc<Rule>> = vocabulary::scanned_rules().cloned().collect();
        for column in 0..self.max_words {
            for rule in &wildcard_rules {
                self.install_scanned(column, rule.clone());
            }
        }
        self.install_lexical(true);
        self.seed();
        for col in 0..self.chart.columns.len() {
            self.work_column(col);
            if let Some(span) = self.chart.columns[0].span_for(START, col) {
                let count = forest::count_span(&self.chart, span, &mut HashMap::new());
                if count > 2 * self.completed_cap as u64 {
                    return Err(GenerateError::TooManyItems { length: col, count });
                }
            }
        }
        Ok(())
    }

    pub fn has_derivation(&self) -> bool {
        self.count_derivations() > 0
    }

    /// Number of finite derivations of the whole input.
    pub fn count_derivations(&self) -> u64 {
        match self.root_span() {
            Some(span) => forest::count_span(&self.chart, span, &mut HashMap::new()),
            None => 0,
        }
    }

    /// Bracketed derivations (or their part-of-speech yields) of the start
    /// span covering columns `0..end_column`; 0 selects the last column.
    pub fn formatted_strings(&self, end_column: usize, pos_yield_only: bool) -> Vec<String> {
        let end = if end_column == 0 {
            self.chart.columns.len() - 1
        } else {
            end_column
        };
        let Some(span) = self.chart.columns[0].span_for(START, end) else {
            return Vec::new();
        };
        forest::enumerate_span(&self.chart, &self.grammar, span, pos_yield_only)
    }

    fn install(&mut self) {
        for entry in self.scanned.clone() {
            self.install_scanned(entry.column, entry.rule);
        }
        self.install_lexical(false);
        self.seed();
    }

    // Pre-scanned items go straight into the start column's reductors, not
    // the agenda: predecessors arriving later pick them up by spontaneous
    // dot shift.
    fn install_scanned(&mut self, column: usize, rule: Arc<Rule>) {
        let dot = rule.rhs.len();
        let id = self.chart.alloc_item(Item {
            rule,
            dot,
            start: column,
            end: column + 1,
            predecessor: None,
            reductor: None,
        });
        self.chart.insert_reductor(id);
    }

    // Lexical rules anchor themselves by matching their quoted prefix
    // against the input. A full-prefix match of the whole rhs becomes a
    // pre-completed span; a partial one becomes an active item with the dot
    // past the prefix. The generator installs them at every position
    // unconditionally.
    fn install_lexical(&mut self, generating: bool) {
        let columns = self.chart.columns.len() - 1;
        let rules: Vec<Arc<Rule>> = self.grammar.lexical_rules().cloned().collect();
        for start in 0..columns {
            for rule in &rules {
                let prefix = rule.literal_prefix_len();
                if start + prefix > columns {
                    continue;
                }
                let matched = generating
                    || rule.rhs[..prefix].iter().enumerate().all(|(offset, symbol)| {
                        self.tokens.get(start + offset).map(String::as_str)
                            == Some(literal_text(symbol))
                    });
                if !matched {
                    continue;
                }
                let item = Item {
                    rule: rule.clone(),
                    dot: prefix,
                    start,
                    end: start + prefix,
                    predecessor: None,
                    reductor: None,
                };
                let id = self.chart.alloc_item(item);
                if prefix == rule.rhs.len() {
                    self.chart.insert_reductor(id);
                } else {
                    self.chart.add_state(id, start + prefix, &self.grammar);
                }
            }
        }
    }

    fn seed(&mut self) {
        let id = self.chart.alloc_item(Item {
            rule: self.gamma.clone(),
            dot: 0,
            start: 0,
            end: 0,
            predecessor: None,
            reductor: None,
        });
        self.chart.add_state(id, 0, &self.grammar);
    }

    fn run(&mut self) -> Recognition {
        for col in 0..self.chart.columns.len() {
            self.work_column(col);
            if self.chart.columns[col].completed_state_count > self.completed_cap {
                self.drain_agendas();
                return Recognition::rejected();
            }
        }
        let accepted = self.root_span().is_some();
        let derivation_indicator = u32::from(self.count_derivations() > 0);
        Recognition {
            accepted,
            derivation_indicator,
        }
    }

    // Complete and Predict alternate until the column settles: an epsilon
    // completion triggered by a prediction re-fills the completed agenda, so
    // a single pass of each is not enough.
    fn work_column(&mut self, col: usize) {
        loop {
            while let Some(item) = self.chart.columns[col].actionable_complete.dequeue() {
                self.complete(col, item);
            }
            while let Some(nonterminal) = self.chart.columns[col].actionable_predict.pop_front() {
                self.predict(col, &nonterminal);
            }
            if self.chart.columns[col].actionable_complete.is_empty() {
                break;
            }
        }
    }

    /// Expand every non-lexical rule for the nonterminal at this column.
    fn predict(&mut self, col: usize, nonterminal: &str) {
        let rules: Vec<Arc<Rule>> = self
            .grammar
            .rules_for(nonterminal)
            .iter()
            .filter(|rule| !rule.lexical)
            .cloned()
            .collect();
        for rule in rules {
            let id = self.chart.alloc_item(Item {
                rule,
                dot: 0,
                start: col,
                end: col,
                predecessor: None,
                reductor: None,
            });
            self.chart.add_state(id, col, &self.grammar);
        }
    }

    /// File the reductor into its start column. Unless the span already
    /// existed there, advance every predecessor waiting on its lhs; on local
    /// ambiguity the predecessors already hold consequents pointing at the
    /// span.
    fn complete(&mut self, _col: usize, reductor: ItemId) {
        let (span, local_ambiguity) = self.chart.insert_reductor(reductor);
        if local_ambiguity {
            return;
        }
        let (start, lhs) = {
            let item = self.chart.item(reductor);
            (item.start, item.rule.lhs.clone())
        };
        let waiting: Vec<ItemId> = self.chart.columns[start]
            .predecessors
            .get(&lhs)
            .cloned()
            .unwrap_or_default();
        for predecessor in waiting {
            self.chart.advance_over(predecessor, span, &self.grammar);
        }
    }

    fn drain_agendas(&mut self) {
        for column in &mut self.chart.columns {
            column.actionable_complete.clear();
            column.actionable_predict.clear();
        }
    }

    fn root_span(&self) -> Option<SpanId> {
        let length = self.chart.columns.len() - 1;
        self.chart.columns[0].span_for(START, length)
    }

    #[cfg(test)]
    pub(crate) fn chart(&self) -> &Chart {
        &self.chart
    }
}
