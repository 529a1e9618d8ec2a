//! MentionRecord: the persisted token → display-name binding
//!
//! Field names follow the persisted schema: `env` is the origin the record
//! applies to, `key` is the shorthand token the user types, `name` is the
//! display name rendered inside the widget, `sfid` is the stable external
//! identifier carried on the widget.
//!
//! Validation has two modes mirroring the settings layer: *lenient* only
//! requires the five string fields to exist, *strict* additionally enforces
//! the format rules (uuid id, url-shaped env, non-empty key/name, 15-or-18
//! alphanumeric sfid).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// =============================================================================
// Types
// =============================================================================

/// A persisted mention registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionRecord {
    /// Opaque unique identifier (uuid under strict validation)
    pub id: String,
    /// Exact origin this record applies to; trailing slash tolerated at
    /// match time
    pub env: String,
    /// Shorthand token the user types
    pub key: String,
    /// Display name rendered inside the widget
    pub name: String,
    /// External identifier, 15 or 18 alphanumeric characters
    pub sfid: String,
}

/// Validation mode for reading persisted record sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Strict,
    Lenient,
}

// =============================================================================
// Format rules
// =============================================================================

fn sfid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z0-9]{15}|[A-Za-z0-9]{18})$").unwrap())
}

fn uuid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
            .unwrap()
    })
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://\S+$").unwrap())
}

impl MentionRecord {
    /// Check this record against a validation mode.
    ///
    /// Lenient never fails: the record already deserialized, so the five
    /// string fields exist. Strict reports the first offending field.
    pub fn validate(&self, mode: ParseMode) -> Result<(), String> {
        if mode == ParseMode::Lenient {
            return Ok(());
        }
        if !uuid_regex().is_match(&self.id) {
            return Err(format!("id is not a uuid: {:?}", self.id));
        }
        if !url_regex().is_match(&self.env) {
            return Err(format!("env is not a url: {:?}", self.env));
        }
        if self.key.is_empty() {
            return Err("key is empty".to_string());
        }
        if self.name.is_empty() {
            return Err("name is empty".to_string());
        }
        if !sfid_regex().is_match(&self.sfid) {
            return Err(format!("sfid is not 15 or 18 alphanumerics: {:?}", self.sfid));
        }
        Ok(())
    }
}

// =============================================================================
// Registration helpers
// =============================================================================

/// True when some record already binds the same env+key combination
pub fn exists(records: &[MentionRecord], target: &MentionRecord) -> bool {
    records
        .iter()
        .any(|r| r.env == target.env && r.key == target.key)
}

/// True when any field of the record is empty
pub fn some_empty(record: &MentionRecord) -> bool {
    [
        &record.env,
        &record.key,
        &record.name,
        &record.sfid,
    ]
    .iter()
    .any(|v| v.is_empty())
}

/// Field-wise fallback fill: empty fields of `base` are taken from
/// `source`; an empty id is minted via `mint_id` (id generation lives with
/// the caller, e.g. the registration form).
pub fn fill_empty(
    base: &MentionRecord,
    source: &MentionRecord,
    mint_id: impl FnOnce() -> String,
) -> MentionRecord {
    fn pick(base: &str, source: &str) -> String {
        if base.is_empty() {
            source.to_string()
        } else {
            base.to_string()
        }
    }
    MentionRecord {
        id: if base.id.is_empty() {
            mint_id()
        } else {
            base.id.clone()
        },
        env: pick(&base.env, &source.env),
        key: pick(&base.key, &source.key),
        name: pick(&base.name, &source.name),
        sfid: pick(&base.sfid, &source.sfid),
    }
}

// =============================================================================
// Tests
// =============================================================================
