//! The substitution pass
//!
//! Walks a subtree with an explicit work-list, finds whole-token matches
//! inside text nodes, and replaces each match with a widget element built
//! from the matching record.
//!
//! Invariants:
//! - Opaque elements (links, line breaks, images, preformatted blocks,
//!   code, existing widgets) are never descended into.
//! - A replaced segment is terminal: the widget and its spacer never
//!   re-enter the work-list, so a pass cannot re-match its own output and
//!   a second pass over the same content is a no-op.
//! - Token precedence is the snapshot's registration order; within one
//!   text node the winner is the lowest (token index, start position)
//!   pair, so an earlier-registered token can consume text a later token
//!   would have matched. That order dependence is the documented behavior.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::dom::{classify, DomTree, NodeData, NodeId};
use crate::engine::widget::{build_spacer, build_widget};
use crate::mention::MentionSnapshot;

// =============================================================================
// Types
// =============================================================================

/// Mutation counters for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassCounters {
    pub widgets_inserted: usize,
    pub text_nodes_scanned: usize,
    pub opaque_skipped: usize,
}

/// A word-boundary token match inside one text node
#[derive(Debug, Clone, PartialEq, Eq)]
struct TokenMatch {
    /// Precedence index into the snapshot's token list
    token: usize,
    /// Byte range of the matched segment
    range: Range<usize>,
}

// =============================================================================
// Pass
// =============================================================================

/// Run one in-place substitution pass over the subtree rooted at `root`.
///
/// Idempotent: running it again with the same snapshot performs zero
/// mutations. `root` itself is never replaced; only descendants are.
pub fn run_pass(tree: &mut DomTree, root: NodeId, snapshot: &MentionSnapshot) -> PassCounters {
    let mut counters = PassCounters::default();
    if snapshot.is_empty() {
        return counters;
    }

    // Work-list of pending nodes instead of recursion: a text node with
    // many repeated occurrences only ever grows the list, not the stack.
    let mut work: Vec<NodeId> = tree.children(root).iter().rev().copied().collect();
    while let Some(node) = work.pop() {
        match tree.data(node) {
            NodeData::Element(_) => {
                if classify(tree, node).is_opaque() {
                    counters.opaque_skipped += 1;
                    continue;
                }
                for child in tree.children(node).iter().rev() {
                    work.push(*child);
                }
            }
            NodeData::Text(text) => {
                counters.text_nodes_scanned += 1;
                let found = match find_match(text, snapshot) {
                    Some(found) => found,
                    None => continue,
                };
                let record = match snapshot.record_at(found.token) {
                    Some(record) => record.clone(),
                    None => continue,
                };
                let split = match tree.split_text(node, found.range) {
                    Ok(split) => split,
                    Err(_) => continue,
                };
                let widget = build_widget(tree, &record);
                let spacer = build_spacer(tree);
                if tree.replace_with(split.middle, &[widget, spacer]).is_err() {
                    continue;
                }
                counters.widgets_inserted += 1;
                // Remainders stay live and re-enter the work-list; the
                // widget and spacer are terminal.
                if let Some(after) = split.after {
                    work.push(after);
                }
                if let Some(before) = split.before {
                    work.push(before);
                }
            }
        }
    }
    counters
}

// =============================================================================
// Matching
// =============================================================================

/// Find the winning token match in a text run: collect every candidate
/// occurrence of every token, drop candidates without word boundaries,
/// then take the minimum by (token precedence, start position).
fn find_match(text: &str, snapshot: &MentionSnapshot) -> Option<TokenMatch> {
    let automaton = snapshot.automaton()?;
    let mut best: Option<TokenMatch> = None;
    for m in automaton.find_overlapping_iter(text) {
        if !boundary_ok(text, m.start(), m.end()) {
            continue;
        }
        let candidate = TokenMatch {
            token: m.pattern().as_usize(),
            range: m.start()..m.end(),
        };
        let better = match &best {
            None => true,
            Some(b) => (candidate.token, candidate.range.start) < (b.token, b.range.start),
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

/// A match must occupy the whole text node or be bounded on each side by
/// the node edge or whitespace. Substring matches adjacent to other
/// non-whitespace characters are rejected; this is whitespace/edge
/// semantics, not full word-regex semantics over punctuation.
fn boundary_ok(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .map_or(true, char::is_whitespace);
    let after_ok = text[end..].chars().next().map_or(true, char::is_whitespace);
    before_ok && after_ok
}

// =============================================================================
// Tests
// =============================================================================
