//! Result cache behaviour seen through the engine.

use crate::common::*;
use std::sync::atomic::Ordering;
use std::time::Duration;

#[test]
fn repeated_search_within_ttl_is_served_from_cache() {
    let (engine, calls) = counting_engine(EngineConfig::default());
    engine.index_content(help_corpus());

    let first = engine.search("bubble", &SearchOptions::default());
    let scored = calls.load(Ordering::SeqCst);
    assert!(scored > 0);

    let second = engine.search("bubble", &SearchOptions::default());
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), scored, "cache hit must not re-score");

    let stats = engine.get_performance_stats();
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.total_searches, 2);
}

#[test]
fn normalization_shares_cache_entries() {
    let (engine, calls) = counting_engine(EngineConfig::default());
    engine.index_content(help_corpus());

    engine.search("bubble", &SearchOptions::default());
    let scored = calls.load(Ordering::SeqCst);
    engine.search("  BUBBLE  ", &SearchOptions::default());
    assert_eq!(calls.load(Ordering::SeqCst), scored);
}

#[test]
fn different_options_use_different_entries() {
    let (engine, calls) = counting_engine(EngineConfig::default());
    engine.index_content(help_corpus());

    engine.search("bubble", &SearchOptions::default());
    let scored = calls.load(Ordering::SeqCst);
    engine.search("bubble", &SearchOptions::new().with_limit(1));
    assert!(calls.load(Ordering::SeqCst) > scored);
    assert_eq!(engine.get_performance_stats().cache_size, 2);
}

#[test]
fn expired_entry_is_recomputed() {
    let (engine, calls) = counting_engine(short_ttl_config(Duration::from_millis(50)));
    engine.index_content(help_corpus());

    let first = engine.search("bubble", &SearchOptions::default());
    let scored = calls.load(Ordering::SeqCst);

    std::thread::sleep(Duration::from_millis(120));

    let again = engine.search("bubble", &SearchOptions::default());
    assert_eq!(first, again);
    assert_eq!(calls.load(Ordering::SeqCst), scored * 2);
    assert_eq!(engine.get_performance_stats().cache_hits, 0);
}

#[test]
fn cache_never_exceeds_capacity() {
    let engine = engine_with(EngineConfig::default().with_max_cache_size(3));
    engine.index_content(help_corpus());

    for q in ["bubble", "score", "combo", "audio", "pop", "chains", "aim", "music"] {
        engine.search(q, &SearchOptions::default());
        assert!(engine.get_performance_stats().cache_size <= 3);
    }
    assert_eq!(engine.get_performance_stats().cache_size, 3);
}

#[test]
fn indexing_invalidates_cached_results() {
    let engine = quiet_engine();
    engine.index_content(help_corpus());
    let before = engine.search("volume", &SearchOptions::new().with_min_score(0.0));
    assert_eq!(ids(&before), vec!["audio"]);

    engine.index_document(
        Document::new("volume")
            .with_title("Volume Controls")
            .with_category("settings"),
    );
    let after = engine.search("volume", &SearchOptions::new().with_min_score(0.0));
    assert_eq!(after[0].id(), "volume");
    assert_eq!(after.len(), 2);
}

#[test]
fn manual_sweep_removes_expired_entries() {
    let engine = engine_with(short_ttl_config(Duration::from_millis(20)));
    engine.index_content(help_corpus());
    engine.search("bubble", &SearchOptions::default());
    engine.search("combo", &SearchOptions::default());

    std::thread::sleep(Duration::from_millis(60));
    assert_eq!(engine.sweep_cache(), 2);
    assert_eq!(engine.get_performance_stats().cache_size, 0);
}
