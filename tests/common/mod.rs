//! Shared test utilities for integration test suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

pub use helpsearch::{
    Document, EngineConfig, InMemoryStore, PersistentStore, Scorer, ScorerContext, SearchEngine,
    SearchHit, SearchOptions, WeightedTfIdfScorer,
};
use tempfile::TempDir;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness (`RUST_LOG`-free, debug level).
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Engines
// ============================================================================

/// Engine with default config and no maintenance thread.
pub fn quiet_engine() -> SearchEngine {
    init_tracing();
    SearchEngine::builder()
        .without_background()
        .build()
        .expect("engine should build")
}

/// Engine with the given config and no maintenance thread.
pub fn engine_with(config: EngineConfig) -> SearchEngine {
    init_tracing();
    SearchEngine::builder()
        .config(config)
        .without_background()
        .build()
        .expect("engine should build")
}

/// Engine whose scorer counts invocations.
pub fn counting_engine(config: EngineConfig) -> (SearchEngine, Arc<AtomicUsize>) {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = SearchEngine::builder()
        .config(config)
        .scorer(CountingScorer {
            calls: Arc::clone(&calls),
            inner: WeightedTfIdfScorer::default(),
        })
        .without_background()
        .build()
        .expect("engine should build");
    (engine, calls)
}

/// Default scorer wrapped with an invocation counter.
pub struct CountingScorer {
    pub calls: Arc<AtomicUsize>,
    pub inner: WeightedTfIdfScorer,
}

impl Scorer for CountingScorer {
    fn score(&self, token: &str, doc: &Document, query: &str, ctx: &ScorerContext) -> f64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.score(token, doc, query, ctx)
    }

    fn name(&self) -> &str {
        "counting"
    }
}

// ============================================================================
// Corpora
// ============================================================================

/// The two-document gameplay scenario.
pub fn scenario_docs() -> Vec<Document> {
    vec![
        Document::new("h1")
            .with_title("Bubble Help")
            .with_category("gameplay"),
        Document::new("h2")
            .with_title("Score Help")
            .with_category("gameplay"),
    ]
}

/// A small mixed-language help corpus.
pub fn help_corpus() -> Vec<Document> {
    vec![
        Document::new("basics")
            .with_title("Bubble Basics")
            .with_content("Aim the launcher and pop groups of three or more bubbles.")
            .with_keywords(["shooter", "aim"])
            .with_category("gameplay")
            .with_language("en"),
        Document::new("scoring")
            .with_title("Scoring Rules")
            .with_content("Points are awarded for every popped group. Chains multiply points.")
            .with_category("gameplay")
            .with_language("en"),
        Document::new("combos")
            .with_title("Combo Chains")
            .with_content("Pop groups in quick succession to build a combo multiplier.")
            .with_category("gameplay")
            .with_language("en"),
        Document::new("audio")
            .with_title("Audio Settings")
            .with_content("Adjust music and effect volume from the options menu.")
            .with_category("settings")
            .with_language("en"),
        Document::new("ja-basics")
            .with_title("泡の基本")
            .with_content("同じ色の泡を三つ以上つなげて割ります。")
            .with_category("gameplay")
            .with_language("ja"),
    ]
}

/// Ids of hits, in rank order.
pub fn ids(hits: &[SearchHit]) -> Vec<&str> {
    hits.iter().map(SearchHit::id).collect()
}

/// Temporary directory for file-backed stores and config files.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Config with a short cache TTL.
pub fn short_ttl_config(ttl: Duration) -> EngineConfig {
    EngineConfig::default().with_cache_timeout(ttl)
}
