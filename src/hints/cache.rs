// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! TTL-based hint caching
//!
//! Entries older than the TTL read as misses but stay in place until they are
//! overwritten or pushed out by the size bound. Eviction is by insertion order
//! (FIFO), not by recency of use.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use super::types::HintSet;
use crate::utils::Clock;

/// TTL-bounded, size-bounded cache of hint sets
pub struct HintCache {
    inner: RwLock<CacheInner>,
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, CachedEntry>,
    /// Keys in insertion order, oldest first
    order: VecDeque<String>,
}

struct CachedEntry {
    hints: HintSet,
    created_at: DateTime<Utc>,
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    /// Total entries in cache
    pub total: usize,
    /// Expired entries (not yet evicted)
    pub expired: usize,
    /// Maximum cache capacity
    pub max: usize,
}

/// `lowercase(word):topic:language`
pub fn cache_key(word: &str, topic: &str, language: &str) -> String {
    format!("{}:{}:{}", word.to_lowercase(), topic, language)
}

impl HintCache {
    /// Create a new hint cache
    ///
    /// # Arguments
    /// * `ttl` - How long an entry stays readable
    /// * `max_entries` - Maximum number of entries to store
    pub fn new(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(CacheInner::default()),
            ttl,
            max_entries,
            clock,
        }
    }

    fn is_fresh(&self, entry: &CachedEntry, now: DateTime<Utc>) -> bool {
        match (now - entry.created_at).to_std() {
            Ok(age) => age < self.ttl,
            // created_at in the future (clock stepped back); treat as fresh
            Err(_) => true,
        }
    }

    /// Cached hints for a key, or `None` if absent or expired
    pub fn get(&self, key: &str) -> Option<HintSet> {
        let inner = self.inner.read().ok()?;
        let entry = inner.entries.get(key)?;

        if !self.is_fresh(entry, self.clock.now()) {
            return None;
        }

        Some(entry.hints.clone())
    }

    /// Store hints under a key
    ///
    /// A new key evicts the oldest-inserted entry when the cache is full. An
    /// existing key is refreshed in place and keeps its insertion position.
    pub fn insert(&self, key: &str, hints: HintSet) {
        let mut inner = match self.inner.write() {
            Ok(c) => c,
            Err(_) => return,
        };
        let now = self.clock.now();

        if let Some(entry) = inner.entries.get_mut(key) {
            entry.hints = hints;
            entry.created_at = now;
            return;
        }

        while inner.entries.len() >= self.max_entries {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }

        inner.order.push_back(key.to_string());
        inner.entries.insert(
            key.to_string(),
            CachedEntry {
                hints,
                created_at: now,
            },
        );
    }

    /// Clear all cache entries
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.entries.clear();
            inner.order.clear();
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let inner = match self.inner.read() {
            Ok(c) => c,
            Err(_) => {
                return CacheStats {
                    total: 0,
                    expired: 0,
                    max: self.max_entries,
                }
            }
        };

        let now = self.clock.now();
        let expired = inner
            .entries
            .values()
            .filter(|e| !self.is_fresh(e, now))
            .count();

        CacheStats {
            total: inner.entries.len(),
            expired,
            max: self.max_entries,
        }
    }

    /// Remove expired entries from cache
    pub fn cleanup_expired(&self) {
        if let Ok(mut inner) = self.inner.write() {
            let now = self.clock.now();
            let CacheInner { entries, order } = &mut *inner;
            entries.retain(|_, entry| self.is_fresh(entry, now));
            order.retain(|key| entries.contains_key(key));
        }
    }

    /// Keys in eviction order, oldest first
    pub fn keys_in_insertion_order(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|inner| inner.order.iter().cloned().collect())
            .unwrap_or_default()
    }
}
