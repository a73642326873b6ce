//! The city lookup table and the routing predicate built on it.
//!
//! The table stands in for a real retrieval backend: callers depend on the
//! [`KnowledgeBase`] trait, so another implementation can be swapped in
//! without touching the workflow.

mod builtin;

use std::collections::BTreeMap;

use cityscout_shared::LookupEntry;
use tracing::debug;

pub use builtin::builtin_entries;

/// Normalize a city name for lookup: trim surrounding whitespace and lower-case.
pub fn normalize_city(city: &str) -> String {
    city.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Read-only city knowledge provider.
pub trait KnowledgeBase: Send + Sync {
    /// Find the entry for `city`. Implementations must normalize the input
    /// with [`normalize_city`] semantics.
    fn lookup(&self, city: &str) -> Option<&LookupEntry>;

    /// Routing predicate: is `city` covered by this knowledge base?
    fn contains(&self, city: &str) -> bool {
        self.lookup(city).is_some()
    }
}

// ---------------------------------------------------------------------------
// Static table
// ---------------------------------------------------------------------------

/// In-memory lookup table keyed by normalized city name.
#[derive(Debug, Clone, Default)]
pub struct StaticKnowledgeBase {
    entries: BTreeMap<String, LookupEntry>,
}

impl StaticKnowledgeBase {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table (Paris, Tokyo, New York).
    pub fn builtin() -> Self {
        Self::from_entries(builtin_entries().iter().cloned())
    }

    /// The built-in table with `extra` entries merged over it.
    /// A later entry with the same normalized name replaces an earlier one.
    pub fn with_overrides(extra: impl IntoIterator<Item = LookupEntry>) -> Self {
        let mut kb = Self::builtin();
        for entry in extra {
            kb.insert(entry);
        }
        kb
    }

    pub fn from_entries(entries: impl IntoIterator<Item = LookupEntry>) -> Self {
        let mut kb = Self::new();
        for entry in entries {
            kb.insert(entry);
        }
        kb
    }

    pub fn insert(&mut self, entry: LookupEntry) {
        let key = normalize_city(&entry.city);
        if self.entries.insert(key.clone(), entry).is_some() {
            debug!(city = %key, "lookup entry replaced");
        }
    }

    /// Entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = &LookupEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KnowledgeBase for StaticKnowledgeBase {
    fn lookup(&self, city: &str) -> Option<&LookupEntry> {
        self.entries.get(&normalize_city(city))
    }
}
