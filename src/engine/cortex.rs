//! MentionCortex: Unified Substitution Engine
//!
//! Owns the engine's long-lived state — the current [`MentionSnapshot`]
//! and the [`ChangeDetector`] — and exposes one substitution entry point
//! per trigger. Designed for WASM with a single cross-boundary call per
//! pass: the content script sends the serialized editable subtree (plus
//! optional caret focus) and receives the mutated subtree, the restored
//! caret, and pass statistics.
//!
//! The snapshot is replaced atomically on every `hydrate`; a pass only
//! ever observes a complete working set, never a partial reload.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::caret::{self, CaretPosition, CaretSnapshot};
use crate::dom::{DomTree, NodeId, NodeRepr};
use crate::engine::{is_editable_target, run_pass, ChangeDetector, Trigger};
use crate::mention::{MentionRecord, MentionSnapshot};

// =============================================================================
// Types
// =============================================================================

/// Statistics for one substitution pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstituteStats {
    pub widgets_inserted: usize,
    pub text_nodes_scanned: usize,
    pub opaque_skipped: usize,
    pub total_us: u64,
    /// Content hash of the input subtree as hex string (u64 would overflow
    /// JS Number.MAX_SAFE_INTEGER)
    pub content_hash: String,
    pub was_skipped: bool,
}

/// Result of applying a trigger natively
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerOutcome {
    pub stats: SubstituteStats,
    /// Restored caret, present only for the caret-preserving trigger
    pub caret: Option<CaretPosition>,
}

/// Wire request for one pass: the serialized subtree plus optional caret
/// focus (a child-index path from the root and a char offset inside the
/// focus node)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstituteRequest {
    pub root: NodeRepr,
    #[serde(default)]
    pub trigger: Option<Trigger>,
    #[serde(default)]
    pub focus_path: Option<Vec<usize>>,
    #[serde(default)]
    pub focus_offset: Option<usize>,
}

/// Restored caret in wire form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaretPlacement {
    pub path: Vec<usize>,
    pub offset: usize,
}

/// Wire response: the (possibly mutated) subtree, whether the pass ran,
/// the restored caret, and pass statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstituteResponse {
    pub root: NodeRepr,
    /// False when the target was not a recognized editable region (silent
    /// no-op, not an error)
    pub applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caret: Option<CaretPlacement>,
    pub stats: SubstituteStats,
}

// =============================================================================
// MentionCortex
// =============================================================================

/// Unified mention substitution engine
#[wasm_bindgen]
pub struct MentionCortex {
    snapshot: MentionSnapshot,
    change_detector: ChangeDetector,
}

impl Default for MentionCortex {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl MentionCortex {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            snapshot: MentionSnapshot::default(),
            change_detector: ChangeDetector::new(),
        }
    }

    /// Number of tokens in the active working set
    #[wasm_bindgen(js_name = tokenCount)]
    pub fn token_count(&self) -> usize {
        self.snapshot.len()
    }

    /// Skip rate of the change detector
    #[wasm_bindgen(js_name = skipRate)]
    pub fn skip_rate(&self) -> f64 {
        self.change_detector.skip_rate()
    }

    /// Reset change detection state
    #[wasm_bindgen(js_name = reset)]
    pub fn js_reset(&mut self) {
        self.change_detector.reset();
    }

    /// Replace the working set from the full persisted record list,
    /// filtered to `origin` (JS binding)
    #[wasm_bindgen(js_name = hydrate)]
    pub fn js_hydrate(&mut self, records: JsValue, origin: &str) -> Result<(), JsValue> {
        let records: Vec<MentionRecord> = serde_wasm_bindgen::from_value(records)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse records: {}", e)))?;
        self.hydrate(&records, origin).map_err(|e| JsValue::from_str(&e))
    }

    /// Run one pass over a serialized subtree (JS binding)
    #[wasm_bindgen(js_name = substitute)]
    pub fn js_substitute(&mut self, request: JsValue) -> JsValue {
        let request: SubstituteRequest = match serde_wasm_bindgen::from_value(request) {
            Ok(r) => r,
            Err(e) => {
                web_sys::console::error_1(
                    &format!("[MentionCortex] Failed to parse request: {}", e).into(),
                );
                return JsValue::NULL;
            }
        };
        let response = self.handle_request(request);
        match serde_wasm_bindgen::to_value(&response) {
            Ok(v) => v,
            Err(e) => {
                web_sys::console::error_1(
                    &format!("[MentionCortex] Serialization failed: {:?}", e).into(),
                );
                JsValue::NULL
            }
        }
    }
}

impl MentionCortex {
    /// Replace the working set atomically; the change detector forgets its
    /// state so the new mapping always rescans.
    pub fn hydrate(&mut self, records: &[MentionRecord], origin: &str) -> Result<(), String> {
        self.snapshot = MentionSnapshot::build(records, origin)?;
        self.change_detector.reset();
        Ok(())
    }

    pub fn snapshot(&self) -> &MentionSnapshot {
        &self.snapshot
    }

    /// Run one pass over the subtree rooted at `root`, with change-detector
    /// short-circuiting.
    pub fn substitute(&mut self, tree: &mut DomTree, root: NodeId) -> SubstituteStats {
        let start = instant::Instant::now();
        let change = self.change_detector.check(tree, root);
        let mut stats = SubstituteStats {
            content_hash: format!("{:x}", change.content_hash),
            ..SubstituteStats::default()
        };

        if !change.has_changed {
            stats.was_skipped = true;
            stats.total_us = start.elapsed().as_micros() as u64;
            return stats;
        }

        let counters = run_pass(tree, root, &self.snapshot);
        stats.widgets_inserted = counters.widgets_inserted;
        stats.text_nodes_scanned = counters.text_nodes_scanned;
        stats.opaque_skipped = counters.opaque_skipped;
        if counters.widgets_inserted > 0 {
            // Next check compares against the post-mutation state
            self.change_detector.observe(tree, root);
        }
        stats.total_us = start.elapsed().as_micros() as u64;
        stats
    }

    /// Apply a trigger to an event target. Returns `None` (no action) when
    /// the target is not a recognized editable region. The insert-mention
    /// shortcut wraps the pass in caret capture/restore; the focus node and
    /// char offset come from the host selection.
    pub fn apply_trigger(
        &mut self,
        tree: &mut DomTree,
        target: NodeId,
        trigger: Trigger,
        focus: Option<(NodeId, usize)>,
    ) -> Option<TriggerOutcome> {
        if !is_editable_target(tree, target) {
            return None;
        }
        match trigger {
            Trigger::MentionShortcut => {
                let snapshot = focus
                    .map(|(node, offset)| caret::capture(tree, target, node, offset))
                    .unwrap_or_else(CaretSnapshot::unset);
                let stats = self.substitute(tree, target);
                let caret = caret::restore(tree, target, &snapshot);
                Some(TriggerOutcome { stats, caret })
            }
            Trigger::FocusOut | Trigger::CommitLine => Some(TriggerOutcome {
                stats: self.substitute(tree, target),
                caret: None,
            }),
        }
    }

    /// Wire-level request handler shared by the JS binding and tests
    pub fn handle_request(&mut self, request: SubstituteRequest) -> SubstituteResponse {
        let (mut tree, root) = DomTree::from_repr(&request.root);
        let trigger = request.trigger.unwrap_or(Trigger::FocusOut);
        let focus = request.focus_path.as_ref().and_then(|path| {
            tree.node_at_path(root, path)
                .map(|node| (node, request.focus_offset.unwrap_or(0)))
        });
        match self.apply_trigger(&mut tree, root, trigger, focus) {
            Some(outcome) => {
                let caret = outcome.caret.and_then(|pos| {
                    tree.path_of(root, pos.node).map(|path| CaretPlacement {
                        path,
                        offset: pos.offset,
                    })
                });
                SubstituteResponse {
                    root: tree.to_repr(root),
                    applied: true,
                    caret,
                    stats: outcome.stats,
                }
            }
            None => SubstituteResponse {
                root: request.root,
                applied: false,
                caret: None,
                stats: SubstituteStats::default(),
            },
        }
    }
}
