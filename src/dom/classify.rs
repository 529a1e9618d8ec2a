//! Node classification for traversal opacity
//!
//! The substitution pass must not descend into structurally opaque
//! elements: hyperlinks, line breaks, images, preformatted blocks, code
//! spans, or widgets it created on an earlier pass. Classification is a
//! closed enumeration computed once per node and consumed by a match,
//! replacing dynamic element-type dispatch.

use serde::{Deserialize, Serialize};

use crate::dom::{DomTree, NodeData, NodeId};

/// Marker class identifying an already-converted mention widget
pub const MENTION_WIDGET_CLASS: &str = "ql-chatter-mention";

/// Closed category set for element nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    Link,
    LineBreak,
    Image,
    Preformatted,
    Code,
    MentionWidget,
    Other,
}

impl NodeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::Link => "link",
            NodeCategory::LineBreak => "line_break",
            NodeCategory::Image => "image",
            NodeCategory::Preformatted => "preformatted",
            NodeCategory::Code => "code",
            NodeCategory::MentionWidget => "mention_widget",
            NodeCategory::Other => "other",
        }
    }

    /// Opaque categories are never recursed into
    pub fn is_opaque(&self) -> bool {
        !matches!(self, NodeCategory::Other)
    }
}

/// Classify an element node. Text nodes are not elements and have no
/// category; callers dispatch on [`NodeData`] first.
pub fn classify(tree: &DomTree, id: NodeId) -> NodeCategory {
    let data = match tree.data(id) {
        NodeData::Element(data) => data,
        NodeData::Text(_) => return NodeCategory::Other,
    };
    match data.tag.as_str() {
        "a" => NodeCategory::Link,
        "br" => NodeCategory::LineBreak,
        "img" => NodeCategory::Image,
        "pre" => NodeCategory::Preformatted,
        "code" => NodeCategory::Code,
        "span" if data.has_class(MENTION_WIDGET_CLASS) => NodeCategory::MentionWidget,
        _ => NodeCategory::Other,
    }
}

// =============================================================================
// Tests
// =============================================================================
