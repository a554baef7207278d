//! Derivation counting and enumeration over the shared packed forest.
//!
//! Back pointers make the forest a graph that may contain cycles (unit
//! productions), so both traversals colour spans: counting keeps a map from
//! span to count where "present with 0" doubles as the grey mark, and
//! enumeration keeps the set of spans on the current path. A grey span
//! contributes nothing, which is what makes cyclic derivations count as
//! zero instead of diverging.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::chart::{Chart, ItemId, SpanId};
use crate::grammar::{literal_text, Grammar};

/// Number of finite derivations rooted at a span.
pub fn count_span(chart: &Chart, span: SpanId, visited: &mut HashMap<SpanId, u64>) -> u64 {
    if let Some(&count) = visited.get(&span) {
        return count;
    }
    visited.insert(span, 0);
    let reductors = chart.span(span).reductors.clone();
    let total = reductors
        .into_iter()
        .map(|item| count_item(chart, item, visited))
        .sum();
    visited.insert(span, total);
    total
}

fn count_item(chart: &Chart, item: ItemId, visited: &mut HashMap<SpanId, u64>) -> u64 {
    let state = chart.item(item);
    let dot = state.dot;
    let predecessor = state.predecessor;
    let reduced = match state.reductor {
        Some(span) => count_span(chart, span, visited),
        None => 1,
    };
    let preceding = match predecessor {
        Some(pred) if dot > 1 => count_item(chart, pred, visited),
        _ => 0,
    };
    if preceding > 0 {
        preceding * reduced
    } else {
        reduced
    }
}

/// Every finite derivation under a span, fully bracketed or as its
/// part-of-speech yield.
pub fn enumerate_span(
    chart: &Chart,
    grammar: &Grammar,
    span: SpanId,
    pos_yield_only: bool,
) -> Vec<String> {
    let mut grey = HashSet::new();
    walk_span(chart, grammar, span, &mut grey, pos_yield_only)
        .into_iter()
        .collect()
}

fn walk_span(
    chart: &Chart,
    grammar: &Grammar,
    span: SpanId,
    grey: &mut HashSet<SpanId>,
    pos_yield: bool,
) -> BTreeSet<String> {
    if !grey.insert(span) {
        return BTreeSet::new();
    }
    let lhs = chart.span(span).lhs.clone();
    let reductors = chart.span(span).reductors.clone();
    let mut out = BTreeSet::new();
    for item in reductors {
        for inner in walk_item(chart, grammar, item, grey, pos_yield) {
            if pos_yield {
                out.insert(inner);
            } else {
                match grammar.display_name(&lhs) {
                    Some(name) => {
                        out.insert(format!("({name} {inner})"));
                    }
                    // POS bridges are invisible in bracketed output.
                    None => {
                        out.insert(inner);
                    }
                }
            }
        }
    }
    grey.remove(&span);
    out
}

fn walk_item(
    chart: &Chart,
    grammar: &Grammar,
    item: ItemId,
    grey: &mut HashSet<SpanId>,
    pos_yield: bool,
) -> BTreeSet<String> {
    let state = chart.item(item);
    let dot = state.dot;
    let predecessor = state.predecessor;
    let reductor = state.reductor;
    let reduced = match reductor {
        Some(span) => walk_span(chart, grammar, span, grey, pos_yield),
        None => leaf_strings(chart, item, pos_yield),
    };
    let preceding = match predecessor {
        Some(pred) if dot > 1 => walk_item(chart, grammar, pred, grey, pos_yield),
        _ => BTreeSet::new(),
    };
    if preceding.is_empty() {
        return reduced;
    }
    let mut out = BTreeSet::new();
    for before in &preceding {
        for after in &reduced {
            out.insert(join(before, after));
        }
    }
    out
}

fn join(before: &str, after: &str) -> String {
    if before.is_empty() {
        after.to_string()
    } else if after.is_empty() {
        before.to_string()
    } else {
        format!("{before} {after}")
    }
}

// Leaves: a scanned wildcard yields the token it covered (its category name
// in yield mode and in tokenless generator charts); a lexical prefix yields
// its literal words; an epsilon completion yields the empty string.
fn leaf_strings(chart: &Chart, item: ItemId, pos_yield: bool) -> BTreeSet<String> {
    let state = chart.item(item);
    let text = if state.rule.is_scanned() {
        if pos_yield {
            state.rule.lhs.clone()
        } else {
            chart.columns[state.end]
                .token
                .clone()
                .unwrap_or_else(|| state.rule.lhs.clone())
        }
    } else {
        state.rule.rhs[..state.dot]
            .iter()
            .map(|symbol| literal_text(symbol))
            .collect::<Vec<_>>()
            .join(" ")
    };
    BTreeSet::from([text])
}
