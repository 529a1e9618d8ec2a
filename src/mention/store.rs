//! Tolerant codec for the persisted mention set
//!
//! The extension persists all registrations under one storage key as a
//! JSON array. Reads are best-effort: each entry is decoded and validated
//! independently, and entries that fail are dropped — a corrupt entry can
//! never take the whole set down. Writes are an atomic full replace of the
//! array.
//!
//! The storage transport itself (`chrome.storage.sync`) stays on the JS
//! side; this module only owns the value shape crossing that boundary.

use wasm_bindgen::prelude::*;

use crate::mention::{MentionRecord, ParseMode};

/// Storage key holding the full registration array
pub const STORAGE_KEY: &str = "MENTIONS";

// =============================================================================
// Native codec
// =============================================================================

/// Decode a persisted value entry-by-entry, dropping entries that are not
/// objects of the right shape or that fail `mode` validation.
pub fn read_records(value: &serde_json::Value, mode: ParseMode) -> Vec<MentionRecord> {
    let items = match value.as_array() {
        Some(items) => items,
        None => return Vec::new(),
    };
    items
        .iter()
        .filter_map(|item| serde_json::from_value::<MentionRecord>(item.clone()).ok())
        .filter(|record| record.validate(mode).is_ok())
        .collect()
}

/// Atomic full-replace payload for the storage layer
pub fn write_records(records: &[MentionRecord]) -> serde_json::Value {
    serde_json::json!(records)
}

// =============================================================================
// JS bindings
// =============================================================================

/// Storage key, exported for the JS glue that owns the transport
#[wasm_bindgen(js_name = storageKey)]
pub fn js_storage_key() -> String {
    STORAGE_KEY.to_string()
}

/// Decode a persisted value, dropping invalid entries (JS binding)
#[wasm_bindgen(js_name = parseMentions)]
pub fn js_parse_mentions(data: JsValue, strict: bool) -> JsValue {
    let value: serde_json::Value = match serde_wasm_bindgen::from_value(data) {
        Ok(v) => v,
        Err(_) => return JsValue::NULL,
    };
    let mode = if strict {
        ParseMode::Strict
    } else {
        ParseMode::Lenient
    };
    let records = read_records(&value, mode);
    match serde_wasm_bindgen::to_value(&records) {
        Ok(v) => v,
        Err(e) => {
            web_sys::console::error_1(
                &format!("[MentionStore] Serialization failed: {:?}", e).into(),
            );
            JsValue::NULL
        }
    }
}

/// Full-replace payload from a record array (JS binding)
#[wasm_bindgen(js_name = serializeMentions)]
pub fn js_serialize_mentions(records: JsValue) -> Result<JsValue, JsValue> {
    let records: Vec<MentionRecord> = serde_wasm_bindgen::from_value(records)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse records: {}", e)))?;
    serde_wasm_bindgen::to_value(&write_records(&records))
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize records: {:?}", e)))
}

// =============================================================================
// Tests
// =============================================================================
