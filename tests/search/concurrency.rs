//! Searches racing index swaps and each other.

use crate::common::*;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn concurrent_searches_agree() {
    let engine = Arc::new(quiet_engine());
    engine.index_content(help_corpus());
    let expected = engine.search("pop groups", &SearchOptions::default());

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..50)
                    .map(|_| engine.search("pop groups", &SearchOptions::default()))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for h in handles {
        for hits in h.join().unwrap() {
            assert_eq!(hits, expected);
        }
    }
    let stats = engine.get_performance_stats();
    assert_eq!(stats.total_searches, 401);
    assert_eq!(stats.cache_hits, 400);
}

#[test]
fn searches_see_whole_snapshots_during_reindex() {
    let engine = Arc::new(quiet_engine());
    engine.index_content(scenario_docs());

    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for i in 0..50 {
                engine.index_content((0..4).map(|j| {
                    Document::new(format!("extra-{}-{}", i, j))
                        .with_title(format!("Bubble Extra {}", j))
                        .with_category("gameplay")
                }));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..200 {
                    let hits = engine.search("bubble help", &SearchOptions::new().with_min_score(0.0));
                    // h1 is in every snapshot and always matches
                    assert!(hits.iter().any(|h| h.id() == "h1"));
                    for h in &hits {
                        assert!(h.relevance_score.is_finite() && h.relevance_score >= 0.0);
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(engine.document_count(), 2 + 50 * 4);
}

#[test]
fn engine_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SearchEngine>();
}
