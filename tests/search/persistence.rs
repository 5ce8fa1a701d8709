//! Popular-query history saved to and restored from a `PersistentStore`.

use crate::common::*;
use helpsearch::FileStore;
use std::sync::Arc;

#[test]
fn history_survives_engine_restart() {
    init_tracing();
    let dir = temp_dir();

    {
        let store = FileStore::open(dir.path()).unwrap();
        let engine = SearchEngine::builder().store(store).build().unwrap();
        engine.index_content(help_corpus());
        engine.search("bubble", &SearchOptions::default());
        engine.search("bubble", &SearchOptions::default());
        engine.search("combo", &SearchOptions::default());
        engine.flush_background();
    }

    let store = FileStore::open(dir.path()).unwrap();
    let raw = store.get("search_history").unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(json["popularQueries"].is_array());

    let engine = SearchEngine::builder().store(store).build().unwrap();
    let popular = engine.get_performance_stats().popular_queries;
    assert_eq!(popular[0].query, "bubble");
    assert_eq!(popular[0].count, 2);
    assert_eq!(popular[1].query, "combo");
    assert_eq!(popular[1].count, 1);
}

#[test]
fn corrupt_history_starts_empty() {
    let store = Arc::new(InMemoryStore::new());
    store.set("search_history", "{not json").unwrap();

    let engine = SearchEngine::builder()
        .shared_store(store.clone())
        .without_background()
        .build()
        .unwrap();
    assert!(engine.get_performance_stats().popular_queries.is_empty());

    // the next search overwrites the bad value
    engine.index_content(scenario_docs());
    engine.search("bubble", &SearchOptions::default());
    let raw = store.get("search_history").unwrap().unwrap();
    assert_eq!(raw, r#"{"popularQueries":[["bubble",1]]}"#);
}

#[test]
fn custom_history_key() {
    let store = Arc::new(InMemoryStore::new());
    let config = EngineConfig {
        history_key: "help_queries".to_string(),
        ..EngineConfig::default()
    };
    let engine = SearchEngine::builder()
        .config(config)
        .shared_store(store.clone())
        .without_background()
        .build()
        .unwrap();
    engine.search("anything", &SearchOptions::default());

    assert!(store.get("help_queries").unwrap().is_some());
    assert!(store.get("search_history").unwrap().is_none());
}
