//! Parsed-response cache
//!
//! Sink listings rarely change between polls, so the inspector can skip
//! re-parsing a report it has already seen. Entries are keyed by the raw
//! report text. When the cache reaches its size limit it is cleared entirely
//! before the next insert; there is no per-entry eviction.
//!
//! This is purely an optimisation. A cache hit returns exactly what parsing
//! the same text would return.

use std::collections::HashMap;

/// Default number of distinct reports kept before flushing
pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// Bounded map from raw report text to its parsed value
#[derive(Debug)]
pub struct ResponseCache<T> {
    size_limit: usize,
    entries: HashMap<String, T>,
    lookups: u64,
    hits: u64,
}

impl<T: Clone> ResponseCache<T> {
    /// Create a cache holding at most `size_limit` entries (0 disables caching)
    #[must_use]
    pub fn new(size_limit: usize) -> Self {
        Self {
            size_limit,
            entries: HashMap::new(),
            lookups: 0,
            hits: 0,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.size_limit > 0
    }

    /// Look up a previously parsed report
    pub fn get(&mut self, key: &str) -> Option<T> {
        if !self.is_enabled() {
            return None;
        }

        self.lookups += 1;
        let found = self.entries.get(key).cloned();
        if found.is_some() {
            self.hits += 1;
        }
        found
    }

    /// Store a parsed report, flushing everything first if the cache is full
    pub fn insert(&mut self, key: &str, value: T) {
        if !self.is_enabled() {
            return;
        }

        if self.entries.len() >= self.size_limit {
            self.entries.clear();
        }
        self.entries.entry(key.to_string()).or_insert(value);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fraction of lookups that were hits (0.0 before the first lookup)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}
