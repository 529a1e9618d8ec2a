//! MentionSnapshot: origin-filtered immutable working set
//!
//! Built fresh from the full persisted record list on activation and on
//! every storage-change notification, then swapped in atomically. A
//! substitution pass only ever sees one complete snapshot; it is never
//! partially mutated.
//!
//! Token precedence is the insertion order of the original list, filtered
//! to the current origin. Matching uses Aho-Corasick over the token list;
//! the automaton's pattern index doubles as the precedence index.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use std::collections::HashMap;

use crate::mention::MentionRecord;

// =============================================================================
// Origin matching
// =============================================================================

/// Exact origin comparison, tolerating one trailing slash on either side
pub fn env_matches_origin(env: &str, origin: &str) -> bool {
    strip_one_trailing_slash(env) == strip_one_trailing_slash(origin)
}

fn strip_one_trailing_slash(s: &str) -> &str {
    s.strip_suffix('/').unwrap_or(s)
}

// =============================================================================
// MentionSnapshot
// =============================================================================

/// Immutable token working set for one origin
#[derive(Debug, Default)]
pub struct MentionSnapshot {
    /// Tokens in application precedence order
    keys: Vec<String>,
    /// Token → record
    records: HashMap<String, MentionRecord>,
    /// Compiled matcher over `keys`; None when no token survived filtering
    automaton: Option<AhoCorasick>,
}

impl MentionSnapshot {
    /// Build a working set from the full persisted list, keeping only
    /// records registered for `origin`. Duplicate tokens keep the first
    /// record (the storage layer forbids duplicates upstream).
    pub fn build(records: &[MentionRecord], origin: &str) -> Result<Self, String> {
        let mut keys: Vec<String> = Vec::new();
        let mut map: HashMap<String, MentionRecord> = HashMap::new();
        for record in records {
            if !env_matches_origin(&record.env, origin) {
                continue;
            }
            if record.key.is_empty() || map.contains_key(&record.key) {
                continue;
            }
            keys.push(record.key.clone());
            map.insert(record.key.clone(), record.clone());
        }

        let automaton = if keys.is_empty() {
            None
        } else {
            Some(
                AhoCorasickBuilder::new()
                    .match_kind(MatchKind::Standard)
                    .build(&keys)
                    .map_err(|e| format!("failed to build token automaton: {}", e))?,
            )
        };

        Ok(Self {
            keys,
            records: map,
            automaton,
        })
    }

    /// Tokens in precedence order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn record(&self, key: &str) -> Option<&MentionRecord> {
        self.records.get(key)
    }

    /// Record at a precedence index (= automaton pattern index)
    pub fn record_at(&self, index: usize) -> Option<&MentionRecord> {
        self.keys.get(index).and_then(|k| self.records.get(k))
    }

    pub fn automaton(&self) -> Option<&AhoCorasick> {
        self.automaton.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
