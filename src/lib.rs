//! LexCore: Mention Substitution Engine
//!
//! A Rust/WASM implementation of the chatter mention substitution pipeline
//! for contenteditable rich-text areas.
//!
//! # Architecture
//!
//! ## DOM model
//! - `dom/tree.rs` - DomTree: explicit node arena mirroring the editable
//!   subtree, with split/replace primitives and a serde boundary form
//! - `dom/classify.rs` - Closed element categories driving traversal opacity
//!
//! ## Mention data
//! - `mention/record.rs` - MentionRecord + strict/lenient validation
//! - `mention/store.rs` - Tolerant codec for the persisted record set
//! - `mention/snapshot.rs` - Origin-filtered working set with a compiled
//!   Aho-Corasick token matcher, swapped atomically on reload
//!
//! ## Engine
//! - `engine/substitute.rs` - Work-list substitution pass (whole-token
//!   matches only, injection-safe widget insertion)
//! - `engine/widget.rs` - Widget element construction
//! - `engine/trigger.rs` - Trigger key combinations + editable detection
//! - `engine/change.rs` - Content-hash skip detection
//! - `engine/cortex.rs` - MentionCortex: **unified engine** - one
//!   `substitute()` per trigger, single WASM call per pass
//! - `caret.rs` - Caret capture/restore across a pass
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { MentionCortex, classifyKey, parseMentions } from 'lexcore';
//!
//! await init();
//!
//! const cortex = new MentionCortex();
//!
//! // Hydrate with the persisted registrations, filtered to this origin
//! const records = parseMentions(stored, /* strict */ true);
//! cortex.hydrate(records, window.location.origin);
//!
//! // One call per pass: serialized subtree in, mutated subtree out
//! const result = cortex.substitute({
//!   root: serialize(editor),
//!   trigger: 'mentionShortcut',
//!   focusPath: [0],
//!   focusOffset: 5,
//! });
//!
//! // Result contains: mutated tree, restored caret, pass stats
//! console.log(result.stats.widgetsInserted);
//! ```

pub mod caret;
pub mod dom;
pub mod engine;
pub mod mention;

// Public exports
pub use caret::*;
pub use dom::*;
pub use engine::*;
pub use mention::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
