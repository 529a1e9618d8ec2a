//! Behavioral contract tests for the substitution engine

use crate::caret::{self, CaretSnapshot};
use crate::dom::{DomTree, ElementData, NodeData, NodeId, MENTION_WIDGET_CLASS};
use crate::engine::{run_pass, MentionCortex, SubstituteRequest, Trigger};
use crate::mention::{MentionRecord, MentionSnapshot};

const ORIGIN: &str = "https://example.my.salesforce.com";

fn record(key: &str, name: &str, sfid: &str) -> MentionRecord {
    MentionRecord {
        id: format!("id-{}", key),
        env: ORIGIN.to_string(),
        key: key.to_string(),
        name: name.to_string(),
        sfid: sfid.to_string(),
    }
}

fn snapshot(keys: &[&str]) -> MentionSnapshot {
    let records: Vec<MentionRecord> = keys
        .iter()
        .enumerate()
        .map(|(i, k)| record(k, &format!("Name {}", k), &format!("{:015}", i)))
        .collect();
    MentionSnapshot::build(&records, ORIGIN).unwrap()
}

/// Editable container with the given direct text content
fn editable_with_text(text: &str) -> (DomTree, NodeId) {
    let mut tree = DomTree::new();
    let root = tree.new_element(
        ElementData::new("div")
            .with_class("ql-editor")
            .with_class("slds-rich-text-area__content"),
    );
    let t = tree.new_text(text);
    tree.append_child(root, t);
    (tree, root)
}

fn widget_sfids(tree: &DomTree, root: NodeId) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Some(data) = tree.element(node) {
            if data.has_class(MENTION_WIDGET_CLASS) {
                out.push(data.attrs.get("data-mention").cloned().unwrap_or_default());
            }
            for child in tree.children(node).iter().rev() {
                stack.push(*child);
            }
        }
    }
    out
}

/// Text runs outside of generated widgets
fn text_runs(tree: &DomTree, root: NodeId) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match tree.data(node) {
            NodeData::Text(text) => out.push(text.clone()),
            NodeData::Element(data) => {
                if data.has_class(MENTION_WIDGET_CLASS) {
                    continue;
                }
                for child in tree.children(node).iter().rev() {
                    stack.push(*child);
                }
            }
        }
    }
    out
}

// =============================================================================
// Substitution pass
// =============================================================================

#[test]
fn pass_is_idempotent() {
    // Contract: a second pass over the same root and mapping mutates nothing
    let snap = snapshot(&["zoo"]);
    let (mut tree, root) = editable_with_text("a zoo b");
    let first = run_pass(&mut tree, root, &snap);
    assert_eq!(first.widgets_inserted, 1);
    let after_first = tree.to_repr(root);

    let second = run_pass(&mut tree, root, &snap);
    assert_eq!(second.widgets_inserted, 0);
    assert_eq!(tree.to_repr(root), after_first);
}

#[test]
fn no_cross_token_corruption() {
    // Contract: {zoo, fizz} in that precedence order over "fizz zoo bar"
    // replaces both tokens independently and leaves "bar" as text
    let snap = snapshot(&["zoo", "fizz"]);
    let (mut tree, root) = editable_with_text("fizz zoo bar");
    let counters = run_pass(&mut tree, root, &snap);
    assert_eq!(counters.widgets_inserted, 2);

    let sfids = widget_sfids(&tree, root);
    // Document order: the fizz widget precedes the zoo widget
    assert_eq!(sfids, [format!("{:015}", 1), format!("{:015}", 0)]);

    let runs = text_runs(&tree, root);
    assert!(runs.iter().any(|r| r.contains("bar")), "runs: {:?}", runs);
    assert!(!runs.iter().any(|r| r.contains("fizz")));
    assert!(!runs.iter().any(|r| r.contains("zoo")));
}

#[test]
fn boundary_precision_rejects_partial_words() {
    // Contract: "fizzoo" contains the substring "zoo" but no whole token
    let snap = snapshot(&["zoo"]);
    let (mut tree, root) = editable_with_text("fizzoo");
    let counters = run_pass(&mut tree, root, &snap);
    assert_eq!(counters.widgets_inserted, 0);
    assert_eq!(tree.text_content(root), "fizzoo");
}

#[test]
fn precedence_is_token_order_not_text_position() {
    // Contract: first-registered wins even when a later token overlaps.
    // "a b" registered first consumes the whole prefix...
    let snap = snapshot(&["a b", "a"]);
    let (mut tree, root) = editable_with_text("a b c");
    run_pass(&mut tree, root, &snap);
    assert_eq!(widget_sfids(&tree, root), [format!("{:015}", 0)]);
    assert!(tree.text_content(root).ends_with(" c"));

    // ...but with the registration order flipped, "a" wins and "b" survives
    let snap = snapshot(&["a", "a b"]);
    let (mut tree, root) = editable_with_text("a b c");
    run_pass(&mut tree, root, &snap);
    assert_eq!(widget_sfids(&tree, root), [format!("{:015}", 0)]);
    let runs = text_runs(&tree, root);
    assert!(runs.iter().any(|r| r.contains('b')), "runs: {:?}", runs);
}

#[test]
fn repeated_occurrences_all_convert_without_recursion() {
    let snap = snapshot(&["zoo"]);
    let many = std::iter::repeat("zoo")
        .take(200)
        .collect::<Vec<_>>()
        .join(" ");
    let (mut tree, root) = editable_with_text(&many);
    let counters = run_pass(&mut tree, root, &snap);
    assert_eq!(counters.widgets_inserted, 200);
    // A second pass confirms nothing re-matches the generated widgets
    assert_eq!(run_pass(&mut tree, root, &snap).widgets_inserted, 0);
}

#[test]
fn injection_safe_display_name_stays_literal_text() {
    // Contract: a hostile display name is rendered as text content, never
    // parsed as markup
    let hostile = "<img src=x onerror=alert(1)>";
    let records = vec![record("@{evil}", hostile, "005000000000001")];
    let snap = MentionSnapshot::build(&records, ORIGIN).unwrap();
    let (mut tree, root) = editable_with_text("hi @{evil} bye");
    run_pass(&mut tree, root, &snap);

    // No img element anywhere in the tree, and the widget's visible text
    // is exactly the literal string
    let mut widget = None;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Some(data) = tree.element(node) {
            assert_ne!(data.tag, "img");
            if data.has_class(MENTION_WIDGET_CLASS) {
                widget = Some(node);
            }
            for child in tree.children(node).iter().rev() {
                stack.push(*child);
            }
        }
    }
    let widget = widget.expect("widget inserted");
    assert_eq!(tree.text_content(widget), format!("@[{}]", hostile));
}

#[test]
fn opaque_elements_are_never_entered() {
    // Contract: a token inside a link label or a code block is untouched
    let snap = snapshot(&["zoo"]);
    let mut tree = DomTree::new();
    let root = tree.new_element(
        ElementData::new("div")
            .with_class("ql-editor")
            .with_class("slds-rich-text-area__content"),
    );
    let link = tree.new_element(ElementData::new("a"));
    let link_text = tree.new_text("visit zoo today");
    tree.append_child(link, link_text);
    let code = tree.new_element(ElementData::new("code"));
    let code_text = tree.new_text("zoo");
    tree.append_child(code, code_text);
    let pre = tree.new_element(ElementData::new("pre"));
    let pre_text = tree.new_text("zoo zoo");
    tree.append_child(pre, pre_text);
    let plain = tree.new_text(" zoo ");
    tree.append_child(root, link);
    tree.append_child(root, code);
    tree.append_child(root, pre);
    tree.append_child(root, plain);

    let counters = run_pass(&mut tree, root, &snap);
    assert_eq!(counters.widgets_inserted, 1);
    assert_eq!(counters.opaque_skipped, 3);
    assert_eq!(tree.text_content(link), "visit zoo today");
    assert_eq!(tree.text_content(code), "zoo");
    assert_eq!(tree.text_content(pre), "zoo zoo");
}

#[test]
fn non_opaque_inline_elements_are_recursed_into() {
    let snap = snapshot(&["zoo"]);
    let mut tree = DomTree::new();
    let root = tree.new_element(
        ElementData::new("div")
            .with_class("ql-editor")
            .with_class("slds-rich-text-area__content"),
    );
    let em = tree.new_element(ElementData::new("em"));
    let em_text = tree.new_text("a zoo b");
    tree.append_child(em, em_text);
    tree.append_child(root, em);

    let counters = run_pass(&mut tree, root, &snap);
    assert_eq!(counters.widgets_inserted, 1);
    assert_eq!(widget_sfids(&tree, em).len(), 1);
}

#[test]
fn empty_mapping_is_a_no_op() {
    let snap = MentionSnapshot::build(&[], ORIGIN).unwrap();
    let (mut tree, root) = editable_with_text("zoo");
    let counters = run_pass(&mut tree, root, &snap);
    assert_eq!(counters.widgets_inserted, 0);
    assert_eq!(tree.text_content(root), "zoo");
}

// =============================================================================
// Cortex
// =============================================================================

fn hydrated_cortex(keys: &[&str]) -> MentionCortex {
    let records: Vec<MentionRecord> = keys
        .iter()
        .enumerate()
        .map(|(i, k)| record(k, &format!("Name {}", k), &format!("{:015}", i)))
        .collect();
    let mut cortex = MentionCortex::new();
    cortex.hydrate(&records, ORIGIN).unwrap();
    cortex
}

#[test]
fn origin_filtering_excludes_foreign_records() {
    // Contract: records for another origin never apply, trailing slash
    // differences are tolerated
    let records = vec![
        record("@{here}", "Here", "005000000000001"),
        MentionRecord {
            env: "https://elsewhere.example".to_string(),
            ..record("@{there}", "There", "005000000000002")
        },
        MentionRecord {
            env: format!("{}/", ORIGIN),
            ..record("@{slash}", "Slash", "005000000000003")
        },
    ];
    let mut cortex = MentionCortex::new();
    cortex.hydrate(&records, ORIGIN).unwrap();
    assert_eq!(cortex.token_count(), 2);

    let (mut tree, root) = editable_with_text("@{here} @{there} @{slash}");
    let stats = cortex.substitute(&mut tree, root);
    assert_eq!(stats.widgets_inserted, 2);
    let runs = text_runs(&tree, root);
    assert!(runs.iter().any(|r| r.contains("@{there}")), "runs: {:?}", runs);
}

#[test]
fn unchanged_subtree_is_skipped_on_the_second_pass() {
    let mut cortex = hydrated_cortex(&["zoo"]);
    let (mut tree, root) = editable_with_text("a zoo b");
    let first = cortex.substitute(&mut tree, root);
    assert_eq!(first.widgets_inserted, 1);
    assert!(!first.was_skipped);

    let second = cortex.substitute(&mut tree, root);
    assert!(second.was_skipped);
    assert_eq!(second.widgets_inserted, 0);
}

#[test]
fn hydrate_resets_skip_detection() {
    let mut cortex = hydrated_cortex(&["zoo"]);
    let (mut tree, root) = editable_with_text("plain text");
    cortex.substitute(&mut tree, root);
    assert!(cortex.substitute(&mut tree, root).was_skipped);

    // A reload with a token that now matches must rescan
    let records = vec![record("plain", "Plain", "005000000000009")];
    cortex.hydrate(&records, ORIGIN).unwrap();
    let stats = cortex.substitute(&mut tree, root);
    assert!(!stats.was_skipped);
    assert_eq!(stats.widgets_inserted, 1);
}

#[test]
fn non_editable_target_is_a_silent_no_op() {
    let mut cortex = hydrated_cortex(&["zoo"]);
    let mut tree = DomTree::new();
    let root = tree.new_element(ElementData::new("div").with_class("ql-editor"));
    let t = tree.new_text("zoo");
    tree.append_child(root, t);
    assert!(cortex
        .apply_trigger(&mut tree, root, Trigger::FocusOut, None)
        .is_none());
    assert_eq!(tree.text_content(root), "zoo");
}

#[test]
fn mention_shortcut_preserves_the_caret() {
    let mut cortex = hydrated_cortex(&["@{Ada}"]);
    let (mut tree, root) = editable_with_text("hello world");
    let text = tree.children(root)[0];
    let outcome = cortex
        .apply_trigger(&mut tree, root, Trigger::MentionShortcut, Some((text, 5)))
        .unwrap();
    // No match, no mutation: exact restoration at offset 5
    let caret = outcome.caret.unwrap();
    assert_eq!(caret.offset, 5);
    assert_eq!(
        caret::capture(&tree, root, caret.node, caret.offset).offset(),
        Some(5)
    );
}

#[test]
fn caret_is_clamped_after_shrinking_mutation() {
    // "@{Ada} x" (8 chars) becomes widget + spacer + " x"; a caret captured
    // at the very end must land on a valid position, not past the content
    let mut cortex = hydrated_cortex(&["@{Ada}"]);
    let (mut tree, root) = editable_with_text("@{Ada} x");
    let text = tree.children(root)[0];
    let outcome = cortex
        .apply_trigger(&mut tree, root, Trigger::MentionShortcut, Some((text, 8)))
        .unwrap();
    assert_eq!(outcome.stats.widgets_inserted, 1);
    let caret = outcome.caret.unwrap();
    let total = tree.text_len(root);
    let restored = caret::capture(&tree, root, caret.node, caret.offset)
        .offset()
        .unwrap();
    assert!(restored <= total);
}

#[test]
fn focus_outside_container_restores_nothing() {
    let mut cortex = hydrated_cortex(&["@{Ada}"]);
    let (mut tree, root) = editable_with_text("@{Ada}");
    let stray = tree.new_text("outside");
    let outcome = cortex
        .apply_trigger(&mut tree, root, Trigger::MentionShortcut, Some((stray, 2)))
        .unwrap();
    assert_eq!(outcome.stats.widgets_inserted, 1);
    assert!(outcome.caret.is_none());
}

// =============================================================================
// Wire requests
// =============================================================================

#[test]
fn wire_request_round_trip() {
    let mut cortex = hydrated_cortex(&["@{Ada}"]);
    let (tree, root) = editable_with_text("hi @{Ada} bye");
    let response = cortex.handle_request(SubstituteRequest {
        root: tree.to_repr(root),
        trigger: Some(Trigger::MentionShortcut),
        focus_path: Some(vec![0]),
        focus_offset: Some(3),
    });
    assert!(response.applied);
    assert_eq!(response.stats.widgets_inserted, 1);

    let (out_tree, out_root) = DomTree::from_repr(&response.root);
    assert_eq!(widget_sfids(&out_tree, out_root).len(), 1);
    // Caret restored at linear offset 3, before the mutation point
    let caret = response.caret.unwrap();
    let node = out_tree.node_at_path(out_root, &caret.path).unwrap();
    assert_eq!(
        caret::capture(&out_tree, out_root, node, caret.offset).offset(),
        Some(3)
    );
    // Unset snapshots restore nothing
    assert!(caret::restore(&out_tree, out_root, &CaretSnapshot::unset()).is_none());
}

#[test]
fn wire_request_on_non_editable_root_echoes_the_tree() {
    let mut cortex = hydrated_cortex(&["@{Ada}"]);
    let mut tree = DomTree::new();
    let root = tree.new_element(ElementData::new("div"));
    let t = tree.new_text("@{Ada}");
    tree.append_child(root, t);
    let repr = tree.to_repr(root);
    let response = cortex.handle_request(SubstituteRequest {
        root: repr.clone(),
        trigger: None,
        focus_path: None,
        focus_offset: None,
    });
    assert!(!response.applied);
    assert_eq!(response.root, repr);
    assert_eq!(response.stats.widgets_inserted, 0);
}
