//! Result cache
//!
//! Maps `snapshot generation + normalized query + serialized options` to
//! ranked results. Keys from an older generation are never looked up again,
//! so a search racing an index swap cannot serve stale results.
//!
//! - Entries older than the TTL are never returned; `get` evicts them lazily
//!   and `sweep_expired` removes them in bulk.
//! - Size never exceeds capacity. Inserting a new key at capacity evicts the
//!   oldest insertion first (FIFO, not LRU: hits do not refresh position).
//! - All reads and writes go through one mutex.

use helpsearch_core::{SearchHit, SearchOptions};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Build the cache key for a normalized query and its options
pub fn make_key(generation: u64, normalized_query: &str, options: &SearchOptions) -> String {
    format!("{}|{}|{}", generation, normalized_query, options.cache_fragment())
}

#[derive(Debug)]
struct CacheEntry {
    results: Arc<Vec<SearchHit>>,
    inserted_at: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: FxHashMap<String, CacheEntry>,
    /// Keys in insertion order, oldest first
    order: VecDeque<String>,
}

impl CacheState {
    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            if let Some(pos) = self.order.iter().position(|k| k == key) {
                self.order.remove(pos);
            }
        }
    }
}

/// TTL- and size-bounded FIFO cache of search results
#[derive(Debug)]
pub struct ResultCache {
    state: Mutex<CacheState>,
    ttl: Duration,
    capacity: usize,
}

impl ResultCache {
    /// Create a cache with the given TTL and capacity
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        ResultCache {
            state: Mutex::new(CacheState::default()),
            ttl,
            capacity,
        }
    }

    /// Entry time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) > self.ttl
    }

    /// Look up a live entry
    pub fn get(&self, key: &str) -> Option<Arc<Vec<SearchHit>>> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<Arc<Vec<SearchHit>>> {
        let mut state = self.state.lock();
        let expired = match state.entries.get(key) {
            None => return None,
            Some(entry) => self.is_expired(entry, now),
        };
        if expired {
            state.remove(key);
            return None;
        }
        state.entries.get(key).map(|e| Arc::clone(&e.results))
    }

    /// Store results under `key`
    ///
    /// Overwriting a key moves it to the newest position.
    pub fn put(&self, key: String, results: Vec<SearchHit>) {
        self.put_at(key, results, Instant::now());
    }

    pub(crate) fn put_at(&self, key: String, results: Vec<SearchHit>, now: Instant) {
        if self.capacity == 0 {
            return;
        }
        let mut state = self.state.lock();
        state.remove(&key);
        while state.order.len() >= self.capacity {
            match state.order.pop_front() {
                Some(oldest) => {
                    state.entries.remove(&oldest);
                }
                None => break,
            }
        }
        state.order.push_back(key.clone());
        state.entries.insert(
            key,
            CacheEntry {
                results: Arc::new(results),
                inserted_at: now,
            },
        );
    }

    /// Remove every expired entry, returning how many were removed
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    pub(crate) fn sweep_expired_at(&self, now: Instant) -> usize {
        let mut state = self.state.lock();
        let before = state.entries.len();
        let ttl = self.ttl;
        state
            .entries
            .retain(|_, e| now.saturating_duration_since(e.inserted_at) <= ttl);
        let CacheState { entries, order } = &mut *state;
        order.retain(|k| entries.contains_key(k));
        before - entries.len()
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.order.clear();
    }

    /// Number of stored entries (live or not yet swept)
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
