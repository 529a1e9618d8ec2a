//! Mention widget construction
//!
//! A matched token is replaced by a single typed element insertion, never
//! parsed markup: the display name only ever becomes a text node, so a
//! name like `<img src=x onerror=...>` renders as that literal string.
//!
//! The widget is an inline atomic unit: non-editable, not tab-focusable,
//! carrying the semantic marker class the traversal-opacity check keys on
//! plus the generic widget class the host page styles.

use crate::dom::{DomTree, ElementData, NodeId, MENTION_WIDGET_CLASS};
use crate::mention::MentionRecord;

/// Generic widget class expected by the host page's own styling
pub const WIDGET_GENERIC_CLASS: &str = "quill_widget_element";

/// Widget kind carried in the data-widget attribute
pub const WIDGET_KIND: &str = "chatterMention";

/// Spacer inserted after every widget: ZERO WIDTH SPACE + NO-BREAK SPACE,
/// giving the caret a landing site behind the atomic unit
pub const SPACER_TEXT: &str = "\u{200B}\u{A0}";

/// Build the widget element for a record. The returned node is detached;
/// the caller splices it into place.
pub fn build_widget(tree: &mut DomTree, record: &MentionRecord) -> NodeId {
    let widget = tree.new_element(
        ElementData::new("span")
            .with_class(MENTION_WIDGET_CLASS)
            .with_class(WIDGET_GENERIC_CLASS)
            .with_attr("contenteditable", "false")
            .with_attr("tabindex", "-1")
            .with_attr("data-widget", WIDGET_KIND)
            .with_attr("data-mention", record.sfid.clone()),
    );
    let label = tree.new_text(format!("@[{}]", record.name));
    tree.append_child(widget, label);
    widget
}

/// Build the spacer text node that follows a widget
pub fn build_spacer(tree: &mut DomTree) -> NodeId {
    tree.new_text(SPACER_TEXT)
}

// =============================================================================
// Tests
// =============================================================================
