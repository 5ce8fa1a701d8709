//! The gameplay walkthrough: two help pages in one category.

use crate::common::*;

#[test]
fn search_bubble_finds_only_h1() {
    let engine = quiet_engine();
    engine.index_content(scenario_docs());

    let hits = engine.search("bubble", &SearchOptions::default());
    assert_eq!(ids(&hits), vec!["h1"]);
    assert!(hits[0].relevance_score > 0.0);
}

#[test]
fn related_content_of_h1_is_h2() {
    let engine = quiet_engine();
    engine.index_content(scenario_docs());

    let related = engine.get_related_content("h1");
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].id(), "h2");
    assert!(related[0].similarity > 0.0);
}

#[test]
fn stats_after_walkthrough() {
    let engine = quiet_engine();
    engine.index_content(scenario_docs());
    engine.search("bubble", &SearchOptions::default());
    engine.search("bubble", &SearchOptions::default());

    let stats = engine.get_performance_stats();
    assert_eq!(stats.document_count, 2);
    // bubble, help, score, gameplay
    assert_eq!(stats.index_size, 4);
    assert_eq!(stats.total_searches, 2);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.cache_size, 1);
    assert_eq!(stats.popular_queries[0].query, "bubble");
    assert_eq!(stats.popular_queries[0].count, 2);
}
