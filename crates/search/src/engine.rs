//! Search engine orchestrator
//!
//! `SearchEngine` ties the pieces together:
//!
//! ```text
//! ContentSource ─► index_content ─► Tokenizer ─► IndexSnapshot (swap) ─► cache clear
//!
//! search ─► normalize ─► ResultCache ─hit─► copy
//!                            │
//!                           miss
//!                            ▼
//!          Tokenizer ─► QueryExpander ─► postings ─► Scorer ─► filter/rank
//!                            ─► highlights ─► cache ─► stats ─► history save
//! ```
//!
//! # Concurrency
//!
//! Readers clone the current `Arc<IndexSnapshot>` and work on it without
//! holding any lock. Writers serialize on a writer mutex, build the next
//! snapshot from a clone, and publish it under a short write lock. The
//! result cache has its own mutex. Statistics are lock-free apart from the
//! running average and the recent-query ring.

use crate::background::{MaintenanceStats, MaintenanceWorker, DEFAULT_MAX_QUEUE_DEPTH};
use crate::cache::{make_key, ResultCache};
use crate::expander::{QueryExpander, SynonymTable};
use crate::highlight::highlight_document;
use crate::index::IndexSnapshot;
use crate::scorer::{Scorer, ScorerContext, WeightedTfIdfScorer};
use crate::similarity::{jaccard, normalized_similarity};
use crate::stats::{RecentQuery, SearchStats};
use crate::tokenizer::Tokenizer;
use helpsearch_core::{
    ContentSource, Document, EngineConfig, IndexStats, PerformanceStats, PersistentStore,
    RelatedDocument, Result, SearchHit, SearchOptions, SortBy,
};
use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Weak};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Popular queries reported in performance stats
pub const TOP_QUERIES: usize = 10;

/// Maximum did-you-mean suggestions
pub const MAX_DID_YOU_MEAN: usize = 3;

/// Lower bound (inclusive) on similarity for did-you-mean
pub const DID_YOU_MEAN_THRESHOLD: f64 = 0.7;

/// Minimum characters before suggestions are offered
pub const MIN_SUGGESTION_CHARS: usize = 2;

/// Outcome of a bulk indexing call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Documents stored and tokenized
    pub indexed: usize,
    /// Documents rejected (missing id, or unreadable at the source)
    pub skipped: usize,
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`SearchEngine`]
///
/// ```
/// use helpsearch_search::SearchEngine;
/// use helpsearch_core::{Document, InMemoryStore, SearchOptions};
///
/// let engine = SearchEngine::builder()
///     .store(InMemoryStore::new())
///     .without_background()
///     .build()
///     .unwrap();
/// engine.index_content(vec![Document::new("h1").with_title("Bubble Help")]);
/// assert_eq!(engine.search("bubble", &SearchOptions::default()).len(), 1);
/// ```
pub struct SearchEngineBuilder {
    config: EngineConfig,
    store: Option<Arc<dyn PersistentStore>>,
    scorer: Option<Arc<dyn Scorer>>,
    background: bool,
}

impl SearchEngineBuilder {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            store: None,
            scorer: None,
            background: true,
        }
    }

    /// Use the given configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a `helpsearch.toml` file
    pub fn config_file(mut self, path: &Path) -> Result<Self> {
        self.config = EngineConfig::from_file(path)?;
        Ok(self)
    }

    /// Persist popular queries in `store`
    pub fn store(self, store: impl PersistentStore + 'static) -> Self {
        self.shared_store(Arc::new(store))
    }

    /// Persist popular queries in a shared store
    pub fn shared_store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the relevance scorer
    pub fn scorer(mut self, scorer: impl Scorer + 'static) -> Self {
        self.scorer = Some(Arc::new(scorer));
        self
    }

    /// Run without the maintenance thread
    ///
    /// Expired cache entries are then only dropped on lookup or through
    /// [`SearchEngine::sweep_cache`].
    ///
    /// History saves then run inline, one blocking store write per search.
    /// Intended for tests and hosts that cannot spawn threads; with a
    /// file-backed store, prefer the default background mode.
    pub fn without_background(mut self) -> Self {
        self.background = false;
        self
    }

    /// Validate the configuration and start the engine
    ///
    /// # Errors
    ///
    /// `Error::InvalidConfig` for a bad configuration, `Error::IoError` if
    /// the maintenance thread cannot be spawned.
    pub fn build(self) -> Result<SearchEngine> {
        self.config.validate()?;
        let config = self.config;

        let tokenizer = Tokenizer::new(&config.stop_words);
        let expander = QueryExpander::new(SynonymTable::new(&config.synonyms), config.fuzzy_min_len);
        let scorer: Arc<dyn Scorer> = match self.scorer {
            Some(scorer) => scorer,
            None => Arc::new(WeightedTfIdfScorer::new(config.field_weights)),
        };

        let stats = SearchStats::new();
        if let Some(store) = &self.store {
            stats.load_from(store.as_ref(), &config.history_key);
        }

        let inner = Arc::new(EngineInner {
            cache: ResultCache::new(config.cache_timeout(), config.max_cache_size),
            tokenizer,
            expander,
            scorer,
            snapshot: RwLock::new(Arc::new(IndexSnapshot::new())),
            writer: Mutex::new(()),
            stats,
            store: self.store,
            history_pending: AtomicBool::new(false),
            config,
        });

        let worker = if self.background {
            let weak: Weak<EngineInner> = Arc::downgrade(&inner);
            Some(MaintenanceWorker::start(
                inner.config.sweep_interval(),
                DEFAULT_MAX_QUEUE_DEPTH,
                move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.maintenance_tick();
                    }
                },
            )?)
        } else {
            None
        };

        info!(
            scorer = inner.scorer.name(),
            background = worker.is_some(),
            persistent = inner.store.is_some(),
            "search engine ready"
        );
        Ok(SearchEngine { inner, worker })
    }
}

impl Default for SearchEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Engine
// ============================================================================

struct EngineInner {
    config: EngineConfig,
    tokenizer: Tokenizer,
    expander: QueryExpander,
    scorer: Arc<dyn Scorer>,
    snapshot: RwLock<Arc<IndexSnapshot>>,
    /// Serializes index writers
    writer: Mutex<()>,
    cache: ResultCache,
    stats: SearchStats,
    store: Option<Arc<dyn PersistentStore>>,
    /// Set while a history save is queued and has not yet taken its copy
    history_pending: AtomicBool,
}

impl EngineInner {
    fn current(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    fn publish(&self, next: IndexSnapshot) {
        *self.snapshot.write() = Arc::new(next);
        self.cache.clear();
    }

    /// Clone the current snapshot, apply `f`, publish the result
    fn update<R>(&self, f: impl FnOnce(&mut IndexSnapshot) -> (R, bool)) -> R {
        let _writer = self.writer.lock();
        let mut next = IndexSnapshot::clone(&self.current());
        let (result, changed) = f(&mut next);
        if changed {
            next.bump_generation();
            self.publish(next);
        }
        result
    }

    fn optimize(&self) -> usize {
        let min = self.config.min_term_frequency;
        self.update(|snap| {
            let removed = snap.optimize(min);
            (removed, removed > 0)
        })
    }

    fn save_history(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let key = &self.config.history_key;
        if let Err(e) = self.stats.to_history().save(store.as_ref(), key) {
            warn!(key = %key, error = %e, "failed to save search history");
        }
    }

    fn maintenance_tick(&self) {
        let swept = self.cache.sweep_expired();
        let pruned = if self.config.optimize_on_sweep {
            self.optimize()
        } else {
            0
        };
        if swept > 0 || pruned > 0 {
            debug!(swept, pruned, "maintenance tick");
        }
    }

    fn run_query(
        &self,
        snapshot: &IndexSnapshot,
        normalized: &str,
        options: &SearchOptions,
    ) -> Vec<SearchHit> {
        let tokens = self.tokenizer.tokenize_unique(normalized);
        if tokens.is_empty() {
            return Vec::new();
        }
        let index = snapshot.index();
        let documents = snapshot.documents();
        let expanded = self.expander.expand(&tokens, index);

        let mut ctx = ScorerContext::new(documents.len());
        for term in &expanded {
            ctx.add_doc_freq(term, index.document_frequency(term));
        }

        let mut scores: FxHashMap<&str, f64> = FxHashMap::default();
        for term in &expanded {
            let Some(postings) = index.lookup(term) else {
                continue;
            };
            for id in postings.iter() {
                let Some(doc) = documents.get(id) else {
                    continue;
                };
                let score = self.scorer.score(term, doc, normalized, &ctx);
                let score = if score.is_finite() { score.max(0.0) } else { 0.0 };
                *scores.entry(id).or_insert(0.0) += score;
            }
        }

        let min_score = options.min_score.unwrap_or(self.config.default_min_score);
        let limit = options.limit.unwrap_or(self.config.default_limit);

        let mut ranked: Vec<(&Document, f64)> = scores
            .into_iter()
            .filter_map(|(id, score)| documents.get(id).map(|doc| (doc, score)))
            .filter(|(doc, score)| {
                *score >= min_score
                    && options
                        .category
                        .as_deref()
                        .map_or(true, |c| doc.category.as_deref() == Some(c))
                    && options
                        .language
                        .as_deref()
                        .map_or(true, |l| doc.language.as_deref() == Some(l))
            })
            .collect();
        ranked.sort_by(|a, b| {
            let primary = match options.sort_by {
                SortBy::Relevance => Ordering::Equal,
                // None < Some, so undated documents sort last
                SortBy::Date => b.0.last_updated.cmp(&a.0.last_updated),
                SortBy::Popularity => b
                    .0
                    .view_count
                    .unwrap_or(0)
                    .cmp(&a.0.view_count.unwrap_or(0)),
            };
            primary
                .then_with(|| b.1.total_cmp(&a.1))
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        ranked.truncate(limit);

        // original tokens are highlighted in preference to expansions
        let mut highlight_terms: Vec<&str> = tokens.iter().map(String::as_str).collect();
        highlight_terms.extend(
            expanded
                .iter()
                .map(String::as_str)
                .filter(|t| !tokens.iter().any(|o| o.as_str() == *t)),
        );

        ranked
            .into_iter()
            .map(|(doc, score)| SearchHit {
                highlights: highlight_document(doc, highlight_terms.iter().copied()),
                relevance_score: score,
                document: doc.clone(),
            })
            .collect()
    }
}

/// Embedded full-text search engine for help content
///
/// Cheap to share behind an `Arc`; every operation takes `&self`.
pub struct SearchEngine {
    inner: Arc<EngineInner>,
    worker: Option<MaintenanceWorker>,
}

impl SearchEngine {
    /// Start building an engine
    pub fn builder() -> SearchEngineBuilder {
        SearchEngineBuilder::new()
    }

    /// Engine with the given configuration, no persistence, and background
    /// maintenance
    pub fn new(config: EngineConfig) -> Result<Self> {
        SearchEngineBuilder::new().config(config).build()
    }

    /// The active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    // ------------------------------------------------------------------------
    // Indexing
    // ------------------------------------------------------------------------

    /// Index (or re-index) a batch of documents and publish them atomically
    ///
    /// Documents without an id are skipped with a warning. The whole result
    /// cache is invalidated once the batch is visible.
    pub fn index_content<I>(&self, docs: I) -> IndexReport
    where
        I: IntoIterator<Item = Document>,
    {
        let started = Instant::now();
        let weights = &self.inner.config.field_weights;
        let tokenizer = &self.inner.tokenizer;
        let report = self.inner.update(|snap| {
            let mut report = IndexReport::default();
            for doc in docs {
                if snap.index_document(doc, weights, tokenizer) {
                    report.indexed += 1;
                } else {
                    report.skipped += 1;
                }
            }
            (report, report.indexed > 0)
        });
        info!(
            indexed = report.indexed,
            skipped = report.skipped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "indexed content"
        );
        report
    }

    /// Index (or re-index) one document; returns whether it was stored
    pub fn index_document(&self, doc: Document) -> bool {
        self.index_content(std::iter::once(doc)).indexed == 1
    }

    /// Load every document from `source` and index it
    ///
    /// Records the source could not convert count as skipped.
    pub fn reload_from(&self, source: &dyn ContentSource) -> Result<IndexReport> {
        let batch = source.load_batch().map_err(|e| {
            warn!(source = source.name(), error = %e, "content source failed");
            e
        })?;
        debug!(
            source = source.name(),
            documents = batch.documents.len(),
            rejected = batch.rejected,
            "loaded content"
        );
        let mut report = self.index_content(batch.documents);
        report.skipped += batch.rejected;
        Ok(report)
    }

    /// Drop terms whose posting list is shorter than `min_term_frequency`
    ///
    /// Returns the number of terms removed.
    pub fn optimize_index(&self) -> usize {
        let removed = self.inner.optimize();
        info!(removed, "optimized index");
        removed
    }

    /// Clear index, documents and cache, and reset statistics
    pub fn cleanup(&self) {
        {
            let _writer = self.inner.writer.lock();
            let next = self.inner.current().cleared();
            self.inner.publish(next);
        }
        self.inner.stats.reset();
        info!("search engine cleaned up");
    }

    // ------------------------------------------------------------------------
    // Querying
    // ------------------------------------------------------------------------

    /// Ranked search
    ///
    /// `None` or a blank query returns an empty list. Never panics: failures
    /// inside the pipeline are logged and produce an empty list.
    pub fn search<'q>(
        &self,
        query: impl Into<Option<&'q str>>,
        options: &SearchOptions,
    ) -> Vec<SearchHit> {
        let Some(raw) = query.into() else {
            return Vec::new();
        };
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Vec::new();
        }

        let started = Instant::now();
        let snapshot = self.inner.current();
        let key = make_key(snapshot.generation(), &normalized, options);

        if let Some(cached) = self.inner.cache.get(&key) {
            let hits = cached.as_ref().clone();
            self.inner
                .stats
                .record_search(&normalized, started.elapsed(), true, hits.len());
            debug!(query = %normalized, hits = hits.len(), "cache hit");
            self.persist_history();
            return hits;
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.inner.run_query(&snapshot, &normalized, options)
        }));
        let hits = match outcome {
            Ok(hits) => hits,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("(non-string panic)");
                error!(query = %normalized, panic = message, "search failed");
                return Vec::new();
            }
        };

        self.inner.cache.put(key, hits.clone());
        let elapsed = started.elapsed();
        self.inner
            .stats
            .record_search(&normalized, elapsed, false, hits.len());
        debug!(
            query = %normalized,
            hits = hits.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "search"
        );
        self.persist_history();
        hits
    }

    /// Prefix completions for a partial query
    ///
    /// Fewer than two characters yields nothing. Popular queries come first
    /// (most searched first), then indexed terms, then synonym terms, each
    /// at most once.
    pub fn get_suggestions(&self, partial: &str) -> Vec<String> {
        let prefix = partial.trim().to_lowercase();
        if prefix.chars().count() < MIN_SUGGESTION_CHARS {
            return Vec::new();
        }
        let max = self.inner.config.max_suggestions;
        let snapshot = self.inner.current();

        let popular = self.inner.stats.top_queries(usize::MAX);
        let popular = popular.iter().map(|p| p.query.as_str());
        let indexed = snapshot.index().terms_with_prefix(&prefix);
        let synonyms = self.inner.expander.synonyms().all_terms().into_iter();

        let mut seen = FxHashSet::default();
        popular
            .chain(indexed)
            .chain(synonyms)
            .filter(|s| s.starts_with(prefix.as_str()))
            .filter(|s| seen.insert(*s))
            .take(max)
            .map(str::to_string)
            .collect()
    }

    /// Other documents in the same category, most similar first
    ///
    /// Similarity is the Jaccard index of the tokenized `title + content`.
    pub fn get_related_content(&self, id: &str) -> Vec<RelatedDocument> {
        let snapshot = self.inner.current();
        let documents = snapshot.documents();
        let Some(doc) = documents.get(id) else {
            return Vec::new();
        };
        let Some(category) = doc.category.as_deref() else {
            return Vec::new();
        };

        let terms_of = |d: &Document| -> FxHashSet<String> {
            self.inner
                .tokenizer
                .tokenize(&d.similarity_text())
                .into_iter()
                .collect()
        };
        let own = terms_of(doc);

        let mut related: Vec<RelatedDocument> = documents
            .iter()
            .filter(|other| other.id != doc.id && other.category.as_deref() == Some(category))
            .map(|other| RelatedDocument {
                similarity: jaccard(&own, &terms_of(other)),
                document: other.clone(),
            })
            .collect();
        related.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        related.truncate(self.inner.config.max_related);
        related
    }

    /// Alternatives to offer when a query finds nothing
    ///
    /// Indexed terms whose normalized edit similarity to a query token is at
    /// least 0.7 and below 1.0 come first, best first. Remaining slots (three
    /// in total) are filled with the most searched queries other than this
    /// one.
    pub fn did_you_mean(&self, query: &str) -> Vec<String> {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() {
            return Vec::new();
        }
        let tokens = self.inner.tokenizer.tokenize_unique(&normalized);
        let snapshot = self.inner.current();

        let mut best: FxHashMap<&str, f64> = FxHashMap::default();
        for token in &tokens {
            for term in snapshot.index().terms() {
                let sim = normalized_similarity(token, term);
                if (DID_YOU_MEAN_THRESHOLD..1.0).contains(&sim) {
                    let entry = best.entry(term).or_insert(sim);
                    if sim > *entry {
                        *entry = sim;
                    }
                }
            }
        }

        let mut ranked: Vec<(&str, f64)> = best.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let mut suggestions: Vec<String> = ranked
            .into_iter()
            .take(MAX_DID_YOU_MEAN)
            .map(|(t, _)| t.to_string())
            .collect();

        if suggestions.len() < MAX_DID_YOU_MEAN {
            for popular in self.inner.stats.top_queries(usize::MAX) {
                if suggestions.len() >= MAX_DID_YOU_MEAN {
                    break;
                }
                if popular.query != normalized && !suggestions.contains(&popular.query) {
                    suggestions.push(popular.query);
                }
            }
        }
        suggestions
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    /// Monitoring snapshot
    pub fn get_performance_stats(&self) -> PerformanceStats {
        let snapshot = self.inner.current();
        let stats = &self.inner.stats;
        PerformanceStats {
            total_searches: stats.total_searches(),
            cache_hits: stats.cache_hits(),
            cache_hit_rate: stats.cache_hit_rate(),
            average_search_time_ms: stats.average_search_time_ms(),
            index_size: snapshot.index().len(),
            document_count: snapshot.documents().len(),
            cache_size: self.inner.cache.len(),
            popular_queries: stats.top_queries(TOP_QUERIES),
        }
    }

    /// Posting-list length for `term`; 0 if absent
    pub fn document_frequency(&self, term: &str) -> usize {
        self.inner
            .current()
            .index()
            .document_frequency(&term.to_lowercase())
    }

    /// Number of stored documents
    pub fn document_count(&self) -> usize {
        self.inner.current().documents().len()
    }

    /// A stored document by id
    pub fn get_document(&self, id: &str) -> Option<Document> {
        self.inner.current().documents().get(id).cloned()
    }

    /// `(category, count)` pairs, optionally for one language
    pub fn available_categories(&self, language: Option<&str>) -> Vec<(String, usize)> {
        self.inner.current().categories(language)
    }

    /// Index shape statistics
    pub fn index_stats(&self) -> IndexStats {
        self.inner.current().stats()
    }

    /// The last `n` searches, newest first
    pub fn recent_queries(&self, n: usize) -> Vec<RecentQuery> {
        self.inner.stats.recent_queries(n)
    }

    /// Remove expired cache entries now; returns how many were removed
    pub fn sweep_cache(&self) -> usize {
        self.inner.cache.sweep_expired()
    }

    /// Maintenance worker metrics, if the worker is running
    pub fn maintenance_stats(&self) -> Option<MaintenanceStats> {
        self.worker.as_ref().map(MaintenanceWorker::stats)
    }

    /// Block until queued background jobs (history saves) have finished
    pub fn flush_background(&self) {
        if let Some(worker) = &self.worker {
            worker.drain();
        }
    }

    /// Save the popular-query table after a search
    ///
    /// With a worker, saves are coalesced: at most one is queued, and it
    /// copies the table when it runs, so the store always ends up with the
    /// latest counts. Without a worker the save runs on the caller's thread.
    fn persist_history(&self) {
        if self.inner.store.is_none() {
            return;
        }
        let Some(worker) = &self.worker else {
            self.inner.save_history();
            return;
        };
        if self.inner.history_pending.swap(true, AtomicOrdering::AcqRel) {
            return;
        }
        let inner = Arc::clone(&self.inner);
        let submitted = worker.submit(move || {
            inner.history_pending.store(false, AtomicOrdering::Release);
            inner.save_history();
        });
        if submitted.is_err() {
            self.inner
                .history_pending
                .store(false, AtomicOrdering::Release);
            debug!("maintenance queue unavailable, history save dropped");
        }
    }
}

impl Drop for SearchEngine {
    fn drop(&mut self) {
        if let Some(worker) = &self.worker {
            worker.shutdown();
        }
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.inner.current();
        f.debug_struct("SearchEngine")
            .field("scorer", &self.inner.scorer.name())
            .field("documents", &snapshot.documents().len())
            .field("terms", &snapshot.index().len())
            .field("generation", &snapshot.generation())
            .field("background", &self.worker.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
