//! Trigger classification and editable-target detection
//!
//! A pass runs when the editable region loses focus, when the commit-line
//! combination is pressed, or when the insert-mention shortcut is pressed.
//! The shortcut is the only trigger that is suppressed from normal input
//! handling, and the only one that wraps the pass in caret capture/restore.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::dom::{DomTree, NodeId};

/// Both markers are required simultaneously for an element to qualify as
/// an editable target
pub const EDITOR_CLASSES: [&str; 2] = ["ql-editor", "slds-rich-text-area__content"];

// =============================================================================
// Types
// =============================================================================

/// What caused a substitution pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Trigger {
    /// The editable region lost focus
    FocusOut,
    /// Command modifier + Enter
    CommitLine,
    /// Alt + `@`
    MentionShortcut,
}

/// Modifier state of a keydown event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyInput<'a> {
    pub key: &'a str,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
}

/// Which key acts as the command modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    Mac,
    Other,
}

/// A recognized trigger plus whether the event must be suppressed from
/// normal input handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerAction {
    pub trigger: Trigger,
    pub suppress_default: bool,
}

// =============================================================================
// Classification
// =============================================================================

/// True when the node is an element carrying every editor marker class
pub fn is_editable_target(tree: &DomTree, id: NodeId) -> bool {
    match tree.element(id) {
        Some(data) => EDITOR_CLASSES.iter().all(|c| data.has_class(c)),
        None => false,
    }
}

/// Classify a keydown event into a trigger, or None when the engine takes
/// no action
pub fn classify_key(input: KeyInput<'_>, platform: Platform) -> Option<TriggerAction> {
    let command = match platform {
        Platform::Mac => input.meta,
        Platform::Other => input.ctrl,
    };
    if input.key == "Enter" && command {
        return Some(TriggerAction {
            trigger: Trigger::CommitLine,
            suppress_default: false,
        });
    }
    if input.key == "@" && input.alt {
        return Some(TriggerAction {
            trigger: Trigger::MentionShortcut,
            suppress_default: true,
        });
    }
    None
}

// =============================================================================
// JS bindings
// =============================================================================

/// Classify a keydown event (JS binding); returns null for non-triggers
#[wasm_bindgen(js_name = classifyKey)]
pub fn js_classify_key(key: &str, alt: bool, ctrl: bool, meta: bool, is_mac: bool) -> JsValue {
    let platform = if is_mac { Platform::Mac } else { Platform::Other };
    let action = classify_key(
        KeyInput {
            key,
            alt,
            ctrl,
            meta,
        },
        platform,
    );
    match serde_wasm_bindgen::to_value(&action) {
        Ok(v) => v,
        Err(_) => JsValue::NULL,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementData;

    #[test]
    fn editable_target_requires_both_classes() {
        let mut tree = DomTree::new();
        let both = tree.new_element(
            ElementData::new("div")
                .with_class("ql-editor")
                .with_class("slds-rich-text-area__content"),
        );
        let one = tree.new_element(ElementData::new("div").with_class("ql-editor"));
        let none = tree.new_element(ElementData::new("div"));
        let text = tree.new_text("not an element");
        assert!(is_editable_target(&tree, both));
        assert!(!is_editable_target(&tree, one));
        assert!(!is_editable_target(&tree, none));
        assert!(!is_editable_target(&tree, text));
    }

    #[test]
    fn commit_line_uses_the_platform_command_modifier() {
        let enter_meta = KeyInput {
            key: "Enter",
            meta: true,
            ..Default::default()
        };
        let enter_ctrl = KeyInput {
            key: "Enter",
            ctrl: true,
            ..Default::default()
        };
        let commit = classify_key(enter_meta, Platform::Mac).unwrap();
        assert_eq!(commit.trigger, Trigger::CommitLine);
        assert!(!commit.suppress_default);

        assert!(classify_key(enter_meta, Platform::Other).is_none());
        assert!(classify_key(enter_ctrl, Platform::Mac).is_none());
        assert_eq!(
            classify_key(enter_ctrl, Platform::Other).unwrap().trigger,
            Trigger::CommitLine
        );
    }

    #[test]
    fn mention_shortcut_is_alt_at_and_suppressed() {
        let alt_at = KeyInput {
            key: "@",
            alt: true,
            ..Default::default()
        };
        let action = classify_key(alt_at, Platform::Other).unwrap();
        assert_eq!(action.trigger, Trigger::MentionShortcut);
        assert!(action.suppress_default);

        let plain_at = KeyInput {
            key: "@",
            ..Default::default()
        };
        assert!(classify_key(plain_at, Platform::Other).is_none());
    }

    #[test]
    fn ordinary_keys_are_ignored() {
        let input = KeyInput {
            key: "a",
            alt: true,
            ctrl: true,
            meta: true,
        };
        assert!(classify_key(input, Platform::Mac).is_none());
        assert!(classify_key(input, Platform::Other).is_none());
    }
}
