//! Search statistics and query history
//!
//! Counters are atomics, the popular-query table is a `DashMap`, and the
//! running average and recent-query ring sit behind small mutexes, so
//! concurrent searches never contend on one lock.
//!
//! The popular-query table is the only part that is persisted, as
//! `{"popularQueries": [[query, count], ...]}` under the configured key.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use helpsearch_core::{PersistentStore, PopularQuery, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum entries kept in the recent-query ring
pub const MAX_HISTORY: usize = 1000;

/// Persisted form of the popular-query table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistory {
    /// `(query, count)` pairs
    #[serde(default)]
    pub popular_queries: Vec<(String, u64)>,
}

impl SearchHistory {
    /// Read the history stored under `key`
    ///
    /// Missing key yields an empty history. Store or parse failures are
    /// returned to the caller.
    pub fn load(store: &dyn PersistentStore, key: &str) -> Result<Self> {
        match store.get(key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(SearchHistory::default()),
        }
    }

    /// Write the history under `key`
    pub fn save(&self, store: &dyn PersistentStore, key: &str) -> Result<()> {
        let raw = serde_json::to_string(self)?;
        store.set(key, &raw)
    }
}

/// One entry in the recent-query ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentQuery {
    /// Normalized query
    pub query: String,
    /// When the search ran
    pub timestamp: DateTime<Utc>,
    /// Number of hits returned
    pub result_count: usize,
}

#[derive(Debug, Default)]
struct RunningAverage {
    mean_ms: f64,
    samples: u64,
}

/// Counters and tables maintained by the engine
#[derive(Debug, Default)]
pub struct SearchStats {
    total_searches: AtomicU64,
    cache_hits: AtomicU64,
    average: Mutex<RunningAverage>,
    popular: DashMap<String, u64>,
    history: Mutex<VecDeque<RecentQuery>>,
}

impl SearchStats {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one non-blank search
    pub fn record_search(
        &self,
        normalized_query: &str,
        elapsed: Duration,
        cache_hit: bool,
        result_count: usize,
    ) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
        if cache_hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        }

        {
            let mut avg = self.average.lock();
            avg.samples += 1;
            let sample = elapsed.as_secs_f64() * 1000.0;
            avg.mean_ms += (sample - avg.mean_ms) / avg.samples as f64;
        }

        *self.popular.entry(normalized_query.to_string()).or_insert(0) += 1;

        let mut history = self.history.lock();
        if history.len() >= MAX_HISTORY {
            history.pop_front();
        }
        history.push_back(RecentQuery {
            query: normalized_query.to_string(),
            timestamp: Utc::now(),
            result_count,
        });
    }

    /// Total non-blank searches
    pub fn total_searches(&self) -> u64 {
        self.total_searches.load(Ordering::Relaxed)
    }

    /// Searches served from the cache
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Cache hit rate in percent; 0 before any search
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.total_searches();
        if total == 0 {
            return 0.0;
        }
        self.cache_hits() as f64 / total as f64 * 100.0
    }

    /// Cumulative moving average of search time in milliseconds
    pub fn average_search_time_ms(&self) -> f64 {
        self.average.lock().mean_ms
    }

    /// How often a normalized query was searched
    pub fn query_count(&self, normalized_query: &str) -> u64 {
        self.popular.get(normalized_query).map(|c| *c).unwrap_or(0)
    }

    /// Top `n` queries by count, ties broken by query text
    pub fn top_queries(&self, n: usize) -> Vec<PopularQuery> {
        let mut all: Vec<PopularQuery> = self
            .popular
            .iter()
            .map(|e| PopularQuery {
                query: e.key().clone(),
                count: *e.value(),
            })
            .collect();
        all.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.query.cmp(&b.query)));
        all.truncate(n);
        all
    }

    /// The last `n` searches, newest first
    pub fn recent_queries(&self, n: usize) -> Vec<RecentQuery> {
        self.history.lock().iter().rev().take(n).cloned().collect()
    }

    /// Snapshot of the popular-query table for persistence
    pub fn to_history(&self) -> SearchHistory {
        let mut popular_queries: Vec<(String, u64)> = self
            .popular
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
        popular_queries.sort();
        SearchHistory { popular_queries }
    }

    /// Replace the popular-query table with a loaded history
    pub fn restore(&self, history: SearchHistory) {
        self.popular.clear();
        for (query, count) in history.popular_queries {
            let query = query.trim().to_lowercase();
            if query.is_empty() {
                continue;
            }
            *self.popular.entry(query).or_insert(0) += count;
        }
    }

    /// Load the popular-query table from a store
    ///
    /// Missing or corrupt history leaves the table empty; failures are
    /// logged, never returned.
    pub fn load_from(&self, store: &dyn PersistentStore, key: &str) {
        match SearchHistory::load(store, key) {
            Ok(history) => {
                debug!(
                    key,
                    queries = history.popular_queries.len(),
                    "loaded search history"
                );
                self.restore(history);
            }
            Err(e) => {
                warn!(key, error = %e, "ignoring unreadable search history");
                self.popular.clear();
            }
        }
    }

    /// Reset every counter and table
    pub fn reset(&self) {
        self.total_searches.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        *self.average.lock() = RunningAverage::default();
        self.popular.clear();
        self.history.lock().clear();
    }
}
