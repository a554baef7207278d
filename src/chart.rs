//! The chart: Earley sets, items and packed spans.
//!
//! Items and spans live in flat arenas owned by the chart and refer to each
//! other through copyable ids, so the parse forest can contain cycles
//! without shared-ownership loops and a reset is a bulk clear.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::agenda::CompletedAgenda;
use crate::grammar::Grammar;
use crate::grammar::Rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(pub(crate) u32);

/// An Earley state: a dotted rule with its start column plus the back
/// pointers recording how it was derived.
#[derive(Clone)]
pub struct Item {
    pub rule: Arc<Rule>,
    pub dot: usize,
    pub start: usize,
    pub end: usize,
    /// The item with one fewer dot that this one advances.
    pub predecessor: Option<ItemId>,
    /// The packed completed node that advanced it.
    pub reductor: Option<SpanId>,
}

impl Item {
    pub fn completed(&self) -> bool {
        self.dot >= self.rule.rhs.len()
    }

    /// The symbol after the dot, if any.
    pub fn next_term(&self) -> Option<&str> {
        self.rule.rhs.get(self.dot).map(String::as_str)
    }
}

// Identity is the dotted rule plus start column; end and back pointers are
// derived.
impl PartialEq for Item {
    fn eq(&self, other: &Item) -> bool {
        self.rule == other.rule && self.dot == other.dot && self.start == other.start
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rule.hash(state);
        self.dot.hash(state);
        self.start.hash(state);
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let before = self.rule.rhs[..self.dot].join(" ");
        let after = self.rule.rhs[self.dot..].join(" ");
        write!(
            f,
            "({} - {}) {} -> {} \u{00b7} {}",
            self.start, self.end, self.rule.lhs, before, after
        )
    }
}

/// A packed local-ambiguity node: every completed item sharing
/// `(lhs, start, end)`. Each reductor is a distinct derivation.
#[derive(Debug)]
pub struct Span {
    pub lhs: String,
    pub start: usize,
    pub end: usize,
    pub reductors: Vec<ItemId>,
}

/// One Earley set: the chart data for a single input position.
#[derive(Debug, Default)]
pub struct Column {
    pub index: usize,
    /// Token consumed to reach this column; `None` at column 0 and in
    /// generator charts.
    pub token: Option<String>,
    /// Active items waiting on a symbol, keyed by that symbol.
    pub predecessors: HashMap<String, Vec<ItemId>>,
    /// Spans starting at this column, indexed by lhs then spanned length.
    pub reductors: HashMap<String, HashMap<usize, SpanId>>,
    pub actionable_complete: CompletedAgenda,
    pub actionable_predict: VecDeque<String>,
    pub completed_state_count: usize,
}

impl Column {
    fn new(index: usize, token: Option<String>) -> Self {
        Column {
            index,
            token,
            ..Default::default()
        }
    }

    pub fn reset(&mut self) {
        self.predecessors.clear();
        self.reductors.clear();
        self.actionable_complete.clear();
        self.actionable_predict.clear();
        self.completed_state_count = 0;
    }

    pub fn span_for(&self, lhs: &str, length: usize) -> Option<SpanId> {
        self.reductors.get(lhs)?.get(&length).copied()
    }
}

#[derive(Debug, Default)]
pub struct Chart {
    pub columns: Vec<Column>,
    items: Vec<Item>,
    spans: Vec<Span>,
}

impl Chart {
    /// Columns `0..=n` where column `i > 0` carries token `i - 1`.
    pub fn over_tokens(tokens: &[String]) -> Self {
        let columns = std::iter::once(Column::new(0, None))
            .chain(
                tokens
                    .iter()
                    .enumerate()
                    .map(|(i, token)| Column::new(i + 1, Some(token.clone()))),
            )
            .collect();
        Chart {
            columns,
            ..Default::default()
        }
    }

    /// Tokenless chart for the generator.
    pub fn over_positions(length: usize) -> Self {
        Chart {
            columns: (0..=length).map(|i| Column::new(i, None)).collect(),
            ..Default::default()
        }
    }

    pub fn item(&self, id: ItemId) -> &Item {
        &self.items[id.0 as usize]
    }

    pub fn span(&self, id: SpanId) -> &Span {
        &self.spans[id.0 as usize]
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn alloc_item(&mut self, item: Item) -> ItemId {
        let id = ItemId(self.items.len() as u32);
        self.items.push(item);
        id
    }

    /// Clear every column and both arenas; the column/token frame stays.
    pub fn reset(&mut self) {
        self.items.clear();
        self.spans.clear();
        for column in &mut self.columns {
            column.reset();
        }
    }

    /// Insert an item into a column. Active items register as predecessors
    /// of the symbol they expect, enqueue that symbol for prediction on
    /// first sight, and dot-shift against any span already indexed under it;
    /// completed items go to the completed agenda keyed by start column.
    pub fn add_state(&mut self, id: ItemId, col: usize, grammar: &Grammar) {
        self.items[id.0 as usize].end = col;
        if self.item(id).completed() {
            let start = self.item(id).start;
            let column = &mut self.columns[col];
            column.completed_state_count += 1;
            column.actionable_complete.enqueue(start, id);
            return;
        }
        let Some(term) = self.item(id).next_term().map(str::to_string) else {
            return;
        };
        {
            let column = &mut self.columns[col];
            let waiters = column.predecessors.entry(term.clone()).or_default();
            if waiters.is_empty() && grammar.can_expand(&term) {
                column.actionable_predict.push_back(term.clone());
            }
            waiters.push(id);
        }
        // Spontaneous dot shift: the reductor arrived before this
        // predecessor, so the completer never saw the pair.
        let ready: Vec<SpanId> = self.columns[col]
            .reductors
            .get(&term)
            .map(|by_length| by_length.values().copied().collect())
            .unwrap_or_default();
        for span in ready {
            self.advance_over(id, span, grammar);
        }
    }

    /// Advance a predecessor over a completed span, inserting the new item
    /// at the span's end column. Both completer triggers funnel through
    /// here.
    pub fn advance_over(&mut self, predecessor: ItemId, span: SpanId, grammar: &Grammar) {
        let pred = self.item(predecessor);
        let advanced = Item {
            rule: pred.rule.clone(),
            dot: pred.dot + 1,
            start: pred.start,
            end: self.span(span).end,
            predecessor: Some(predecessor),
            reductor: Some(span),
        };
        let end = self.span(span).end;
        let id = self.alloc_item(advanced);
        self.add_state(id, end, grammar);
    }

    /// File a completed item into its start column's span index. Returns the
    /// span and whether it already existed (local ambiguity).
    pub fn insert_reductor(&mut self, id: ItemId) -> (SpanId, bool) {
        let (lhs, start, end) = {
            let item = self.item(id);
            (item.rule.lhs.clone(), item.start, item.end)
        };
        let length = end - start;
        if let Some(existing) = self.columns[start].span_for(&lhs, length) {
            self.spans[existing.0 as usize].reductors.push(id);
            return (existing, true);
        }
        let span = SpanId(self.spans.len() as u32);
        self.spans.push(Span {
            lhs: lhs.clone(),
            start,
            end,
            reductors: vec![id],
        });
        self.columns[start]
            .reductors
            .entry(lhs)
            .or_default()
            .insert(length, span);
        (span, false)
    }
}
