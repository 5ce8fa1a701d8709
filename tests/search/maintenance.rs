//! The background maintenance thread.

use crate::common::*;
use std::time::{Duration, Instant};

fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    cond()
}

#[test]
fn periodic_sweep_clears_expired_entries() {
    init_tracing();
    let config = EngineConfig::default()
        .with_cache_timeout(Duration::from_millis(20))
        .with_sweep_interval(Duration::from_millis(25));
    let engine = SearchEngine::new(config).unwrap();
    engine.index_content(help_corpus());
    engine.search("bubble", &SearchOptions::default());
    engine.search("combo", &SearchOptions::default());

    assert!(wait_until(Duration::from_secs(5), || {
        engine.get_performance_stats().cache_size == 0
    }));
    assert!(engine.maintenance_stats().unwrap().ticks > 0);
}

#[test]
fn optimize_on_sweep_prunes_rare_terms() {
    init_tracing();
    let config = EngineConfig {
        optimize_on_sweep: true,
        ..EngineConfig::default().with_sweep_interval(Duration::from_millis(20))
    };
    let engine = SearchEngine::new(config).unwrap();
    engine.index_content(help_corpus());

    assert!(wait_until(Duration::from_secs(5), || {
        engine.document_frequency("launcher") == 0
    }));
    assert!(engine.document_frequency("gameplay") >= 2);
}

#[test]
fn engine_without_background_has_no_worker() {
    let engine = quiet_engine();
    assert!(engine.maintenance_stats().is_none());
    // no-op
    engine.flush_background();
}

#[test]
fn dropping_engine_stops_worker() {
    init_tracing();
    let engine = SearchEngine::new(
        EngineConfig::default().with_sweep_interval(Duration::from_millis(5)),
    )
    .unwrap();
    engine.index_content(scenario_docs());
    std::thread::sleep(Duration::from_millis(30));
    drop(engine);
}
