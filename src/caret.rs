//! Caret capture and restore across a substitution pass
//!
//! A pass replaces text nodes with widget elements, so the node the
//! browser's selection pointed at may no longer exist afterwards. The
//! tracker reduces the caret to a linear character offset from the start
//! of the editable container before the pass, and places a collapsed
//! caret back at that offset afterwards.
//!
//! Restoration is best-effort: the pass changes the character count, so an
//! offset past the new content length clamps to the end of the last text
//! run rather than failing.

use serde::{Deserialize, Serialize};

use crate::dom::{DomTree, NodeData, NodeId};

// =============================================================================
// Types
// =============================================================================

/// Linear caret offset relative to a container; `None` = unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaretSnapshot {
    offset: Option<usize>,
}

impl CaretSnapshot {
    pub fn unset() -> Self {
        Self { offset: None }
    }

    pub fn at(offset: usize) -> Self {
        Self {
            offset: Some(offset),
        }
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn is_unset(&self) -> bool {
        self.offset.is_none()
    }

    /// Shift the recorded offset, clamping at zero. No-op when unset;
    /// returns the adjusted offset.
    pub fn adjust(&mut self, delta: isize) -> Option<usize> {
        let offset = self.offset?;
        let adjusted = offset.saturating_add_signed(delta);
        self.offset = Some(adjusted);
        self.offset
    }
}

/// A collapsed caret placement inside the tree.
///
/// For a text node, `offset` is a char offset into its text; for an
/// element (only the container itself, when it holds no text), `offset`
/// is 0, meaning "before all content".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretPosition {
    pub node: NodeId,
    pub offset: usize,
}

// =============================================================================
// Capture / restore
// =============================================================================

/// Record the caret's linear char offset from the start of `container`.
///
/// `focus_offset` is a char offset inside the focus node's text. Returns
/// unset when the focus node is not the container or one of its
/// descendants. The walk climbs from the focus node toward the container,
/// accumulating the text length of every preceding sibling; a node with no
/// parent ends the walk with the count accumulated so far.
pub fn capture(
    tree: &DomTree,
    container: NodeId,
    focus: NodeId,
    focus_offset: usize,
) -> CaretSnapshot {
    if !tree.is_descendant_of(focus, container) {
        return CaretSnapshot::unset();
    }
    let mut count = focus_offset;
    let mut node = focus;
    while node != container {
        let parent = match tree.parent(node) {
            Some(p) => p,
            None => break,
        };
        for sibling in tree.children(parent) {
            if *sibling == node {
                break;
            }
            count += tree.text_len(*sibling);
        }
        node = parent;
    }
    CaretSnapshot::at(count)
}

/// Place a collapsed caret at the snapshot's linear offset inside
/// `container`, clamping to the nearest valid position when the offset now
/// exceeds the content length. Returns `None` on an unset snapshot.
pub fn restore(tree: &DomTree, container: NodeId, snapshot: &CaretSnapshot) -> Option<CaretPosition> {
    let mut remaining = snapshot.offset()?;
    if remaining == 0 {
        return Some(CaretPosition {
            node: container,
            offset: 0,
        });
    }

    let mut last_text: Option<(NodeId, usize)> = None;
    let mut stack = vec![container];
    while let Some(node) = stack.pop() {
        match tree.data(node) {
            NodeData::Text(text) => {
                let len = text.chars().count();
                if remaining <= len {
                    return Some(CaretPosition {
                        node,
                        offset: remaining,
                    });
                }
                remaining -= len;
                last_text = Some((node, len));
            }
            NodeData::Element(_) => {
                for child in tree.children(node).iter().rev() {
                    stack.push(*child);
                }
            }
        }
    }

    // Offset exceeds the content length: clamp to the end
    match last_text {
        Some((node, len)) => Some(CaretPosition { node, offset: len }),
        None => Some(CaretPosition {
            node: container,
            offset: 0,
        }),
    }
}

// =============================================================================
// Tests
// =============================================================================
