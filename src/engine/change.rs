//! Content-addressable pass skip detection
//!
//! Hashes the subtree (structure + text) to detect whether anything could
//! have changed since the last completed pass. An unchanged subtree is
//! skipped outright, which keeps repeated triggers (focus flapping, held
//! modifier keys) cheap.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::dom::{DomTree, NodeData, NodeId};

// =============================================================================
// Types
// =============================================================================

/// Result of change detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeResult {
    /// True if content has changed since last check
    pub has_changed: bool,
    /// Current content hash
    pub content_hash: u64,
    /// Previous content hash (if any)
    pub previous_hash: Option<u64>,
}

// =============================================================================
// ChangeDetector
// =============================================================================

/// Content-addressable change detector over a DomTree subtree
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last_hash: Option<u64>,
    check_count: u64,
    skip_count: u64,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare the subtree against the last observed state
    pub fn check(&mut self, tree: &DomTree, root: NodeId) -> ChangeResult {
        let content_hash = hash_subtree(tree, root);
        let previous_hash = self.last_hash;
        let has_changed = previous_hash != Some(content_hash);
        self.check_count += 1;
        if !has_changed {
            self.skip_count += 1;
        }
        self.last_hash = Some(content_hash);
        ChangeResult {
            has_changed,
            content_hash,
            previous_hash,
        }
    }

    /// Record the subtree's current state without counting a check; called
    /// after a pass mutated the tree so the post-mutation state is what the
    /// next check compares against.
    pub fn observe(&mut self, tree: &DomTree, root: NodeId) {
        self.last_hash = Some(hash_subtree(tree, root));
    }

    /// Forget the observed state; the next check always reports a change.
    /// Called on every mapping reload.
    pub fn reset(&mut self) {
        self.last_hash = None;
    }

    /// Skip rate as a percentage
    pub fn skip_rate(&self) -> f64 {
        if self.check_count == 0 {
            return 0.0;
        }
        (self.skip_count as f64 / self.check_count as f64) * 100.0
    }

    pub fn check_count(&self) -> u64 {
        self.check_count
    }

    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }
}

/// Hash structure and text of a subtree in document order
pub fn hash_subtree(tree: &DomTree, root: NodeId) -> u64 {
    let mut hasher = DefaultHasher::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match tree.data(node) {
            NodeData::Text(text) => {
                0u8.hash(&mut hasher);
                text.hash(&mut hasher);
            }
            NodeData::Element(data) => {
                1u8.hash(&mut hasher);
                data.tag.hash(&mut hasher);
                data.classes.hash(&mut hasher);
                for (name, value) in &data.attrs {
                    name.hash(&mut hasher);
                    value.hash(&mut hasher);
                }
                tree.children(node).len().hash(&mut hasher);
                for child in tree.children(node).iter().rev() {
                    stack.push(*child);
                }
            }
        }
    }
    hasher.finish()
}

// =============================================================================
// Tests
// =============================================================================
