//! DomTree: Explicit Node Arena for Contenteditable Subtrees
//!
//! The engine never touches the browser's live DOM directly. The content
//! script serializes the editable subtree, the engine mutates this arena
//! mirror, and the result is serialized back as a full replacement.
//!
//! Nodes are reference-identified by [`NodeId`] indices into the arena.
//! Parent links and ordered child lists make "replace one node with a run
//! of nodes, preserving siblings" a cheap splice, and text splitting is the
//! arena's native primitive for dividing a character run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Types
// =============================================================================

/// Index of a node inside a [`DomTree`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Element payload: tag name, class list, attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementData {
    /// Tag name, stored lowercase
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            classes: Vec::new(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Node payload: either an element or a text run
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

/// Arena entry
#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Result of splitting a text node around a matched range.
///
/// All three parts are live text nodes occupying the original node's
/// position, in order. `before`/`after` are `None` when the range touches
/// the corresponding node edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSplit {
    pub before: Option<NodeId>,
    pub middle: NodeId,
    pub after: Option<NodeId>,
}

/// Serde-friendly nested form of a subtree, used at the WASM boundary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeRepr {
    #[serde(rename_all = "camelCase")]
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        classes: Vec<String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attrs: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<NodeRepr>,
    },
    Text { text: String },
}

// =============================================================================
// DomTree
// =============================================================================

/// Mutable tree of element/text nodes with parent/child links
#[derive(Debug, Clone, Default)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    pub fn new_element(&mut self, data: ElementData) -> NodeId {
        self.alloc(NodeData::Element(data))
    }

    pub fn new_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()].data
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.index()].data {
            NodeData::Element(data) => Some(data),
            NodeData::Text(_) => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.index()].data {
            NodeData::Text(text) => Some(text.as_str()),
            NodeData::Element(_) => None,
        }
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous position first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Remove a node from its parent's child list. The node stays in the
    /// arena but is no longer reachable from the tree.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|c| *c != id);
        }
    }

    /// Replace `old` with a run of nodes at the same position, preserving
    /// all siblings. `old` is detached; the replacements are detached from
    /// any previous position and spliced in order.
    pub fn replace_with(&mut self, old: NodeId, replacements: &[NodeId]) -> Result<(), String> {
        let parent = self.nodes[old.index()]
            .parent
            .ok_or_else(|| "cannot replace a node without a parent".to_string())?;
        for r in replacements {
            self.detach(*r);
        }
        let pos = self.nodes[parent.index()]
            .children
            .iter()
            .position(|c| *c == old)
            .ok_or_else(|| "node missing from its parent's child list".to_string())?;
        self.nodes[old.index()].parent = None;
        self.nodes[parent.index()].children.remove(pos);
        let mut insert_at = pos;
        for r in replacements {
            self.nodes[r.index()].parent = Some(parent);
            self.nodes[parent.index()].children.insert(insert_at, *r);
            insert_at += 1;
        }
        Ok(())
    }

    /// Split a text node around `range` (byte offsets on char boundaries).
    ///
    /// The node is replaced in place by up to three new text nodes:
    /// preceding remainder, the matched segment, following remainder. The
    /// remainders stay live and eligible for further matching.
    pub fn split_text(
        &mut self,
        id: NodeId,
        range: std::ops::Range<usize>,
    ) -> Result<TextSplit, String> {
        let text = match &self.nodes[id.index()].data {
            NodeData::Text(t) => t.clone(),
            NodeData::Element(_) => return Err("split_text on an element node".to_string()),
        };
        if range.start > range.end || range.end > text.len() {
            return Err("split range out of bounds".to_string());
        }
        if !text.is_char_boundary(range.start) || !text.is_char_boundary(range.end) {
            return Err("split range not on char boundaries".to_string());
        }

        let before = if range.start > 0 {
            Some(self.new_text(&text[..range.start]))
        } else {
            None
        };
        let middle = self.new_text(&text[range.clone()]);
        let after = if range.end < text.len() {
            Some(self.new_text(&text[range.end..]))
        } else {
            None
        };

        let mut run: Vec<NodeId> = Vec::with_capacity(3);
        if let Some(b) = before {
            run.push(b);
        }
        run.push(middle);
        if let Some(a) = after {
            run.push(a);
        }
        self.replace_with(id, &run)?;

        Ok(TextSplit { before, middle, after })
    }

    /// Concatenated text of the subtree rooted at `id`, in document order
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            match &self.nodes[node.index()].data {
                NodeData::Text(text) => out.push_str(text),
                NodeData::Element(_) => {
                    for child in self.nodes[node.index()].children.iter().rev() {
                        stack.push(*child);
                    }
                }
            }
        }
        out
    }

    /// Character count of the subtree's text content
    pub fn text_len(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            match &self.nodes[node.index()].data {
                NodeData::Text(text) => count += text.chars().count(),
                NodeData::Element(_) => {
                    for child in self.nodes[node.index()].children.iter().rev() {
                        stack.push(*child);
                    }
                }
            }
        }
        count
    }

    /// True when `id` is `ancestor` itself or one of its descendants
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut node = Some(id);
        while let Some(n) = node {
            if n == ancestor {
                return true;
            }
            node = self.nodes[n.index()].parent;
        }
        false
    }

    /// Resolve a child-index path from `root` to a node
    pub fn node_at_path(&self, root: NodeId, path: &[usize]) -> Option<NodeId> {
        let mut node = root;
        for step in path {
            node = *self.nodes[node.index()].children.get(*step)?;
        }
        Some(node)
    }

    /// Child-index path from `root` down to `id`, or None when `id` is not
    /// in `root`'s subtree
    pub fn path_of(&self, root: NodeId, id: NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut node = id;
        while node != root {
            let parent = self.nodes[node.index()].parent?;
            let pos = self.nodes[parent.index()]
                .children
                .iter()
                .position(|c| *c == node)?;
            path.push(pos);
            node = parent;
        }
        path.reverse();
        Some(path)
    }

    // =========================================================================
    // Boundary representation
    // =========================================================================

    /// Build a tree from its nested boundary form; returns the root id
    pub fn from_repr(repr: &NodeRepr) -> (Self, NodeId) {
        let mut tree = Self::new();
        let root = tree.insert_repr(repr);
        (tree, root)
    }

    fn insert_repr(&mut self, repr: &NodeRepr) -> NodeId {
        match repr {
            NodeRepr::Text { text } => self.new_text(text.clone()),
            NodeRepr::Element {
                tag,
                classes,
                attrs,
                children,
            } => {
                let id = self.new_element(ElementData {
                    tag: tag.to_ascii_lowercase(),
                    classes: classes.clone(),
                    attrs: attrs.clone(),
                });
                for child in children {
                    let child_id = self.insert_repr(child);
                    self.append_child(id, child_id);
                }
                id
            }
        }
    }

    /// Nested boundary form of the subtree rooted at `id`
    pub fn to_repr(&self, id: NodeId) -> NodeRepr {
        match &self.nodes[id.index()].data {
            NodeData::Text(text) => NodeRepr::Text { text: text.clone() },
            NodeData::Element(data) => NodeRepr::Element {
                tag: data.tag.clone(),
                classes: data.classes.clone(),
                attrs: data.attrs.clone(),
                children: self.nodes[id.index()]
                    .children
                    .iter()
                    .map(|c| self.to_repr(*c))
                    .collect(),
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
