//! Index maintenance: term presence, idempotence, optimization, cleanup.

use crate::common::*;
use helpsearch::{Field, JsonFileSource, StaticSource, Tokenizer};

#[test]
fn every_indexed_token_has_a_posting() {
    let engine = quiet_engine();
    let corpus = help_corpus();
    engine.index_content(corpus.clone());

    let tokenizer = Tokenizer::default();
    for doc in &corpus {
        for field in Field::ALL {
            let Some(text) = doc.field_text(field) else {
                continue;
            };
            for token in tokenizer.tokenize(&text) {
                assert!(
                    engine.document_frequency(&token) >= 1,
                    "token {:?} from {} of {} has no posting",
                    token,
                    field,
                    doc.id
                );
            }
        }
    }
}

#[test]
fn extra_fields_are_not_indexed() {
    let engine = quiet_engine();
    engine.index_content(vec![Document::new("d")
        .with_title("Visible")
        .with_extra("internalNote", serde_json::json!("hidden"))]);

    assert_eq!(engine.document_frequency("visible"), 1);
    assert_eq!(engine.document_frequency("hidden"), 0);
    let stored = engine.get_document("d").unwrap();
    assert_eq!(stored.extra["internalNote"], "hidden");
}

#[test]
fn reindexing_same_corpus_is_idempotent() {
    let engine = quiet_engine();
    engine.index_content(help_corpus());
    let before_stats = engine.index_stats();
    let before = engine.search("pop groups", &SearchOptions::new().with_min_score(0.0));

    engine.index_content(help_corpus());
    let after_stats = engine.index_stats();
    let after = engine.search("pop groups", &SearchOptions::new().with_min_score(0.0));

    assert_eq!(before_stats, after_stats);
    assert_eq!(engine.document_count(), help_corpus().len());
    assert_eq!(before, after);
}

#[test]
fn reindexing_a_document_replaces_its_terms() {
    let engine = quiet_engine();
    engine.index_content(help_corpus());
    assert_eq!(engine.document_frequency("launcher"), 1);

    engine.index_document(
        Document::new("basics")
            .with_title("Bubble Basics")
            .with_content("Tap to fire.")
            .with_category("gameplay"),
    );
    assert_eq!(engine.document_frequency("launcher"), 0);
    assert_eq!(engine.document_frequency("fire"), 1);
    assert_eq!(engine.document_count(), help_corpus().len());
}

#[test]
fn documents_without_id_are_skipped() {
    let engine = quiet_engine();
    let mut docs = help_corpus();
    docs.push(Document::new("").with_title("Orphan page"));

    let report = engine.index_content(docs);
    assert_eq!(report.indexed, help_corpus().len());
    assert_eq!(report.skipped, 1);
    assert_eq!(engine.document_frequency("orphan"), 0);
}

#[test]
fn optimize_drops_rare_terms() {
    let engine = quiet_engine();
    engine.index_content(help_corpus());
    let terms_before = engine.get_performance_stats().index_size;

    let removed = engine.optimize_index();
    assert!(removed > 0);
    assert_eq!(engine.get_performance_stats().index_size, terms_before - removed);
    assert_eq!(engine.document_frequency("launcher"), 0);
    // shared by several documents
    assert!(engine.document_frequency("gameplay") >= 2);
}

#[test]
fn cleanup_empties_everything() {
    let engine = quiet_engine();
    engine.index_content(help_corpus());
    engine.search("bubble", &SearchOptions::default());
    engine.cleanup();

    let stats = engine.get_performance_stats();
    assert_eq!(stats.document_count, 0);
    assert_eq!(stats.index_size, 0);
    assert_eq!(stats.cache_size, 0);
    assert_eq!(stats.total_searches, 0);
    assert!(engine.available_categories(None).is_empty());

    // usable again afterwards
    engine.index_content(scenario_docs());
    assert_eq!(ids(&engine.search("bubble", &SearchOptions::default())), vec!["h1"]);
}

#[test]
fn categories_and_stats() {
    let engine = quiet_engine();
    engine.index_content(help_corpus());

    assert_eq!(
        engine.available_categories(None),
        vec![("gameplay".to_string(), 4), ("settings".to_string(), 1)]
    );
    assert_eq!(
        engine.available_categories(Some("ja")),
        vec![("gameplay".to_string(), 1)]
    );

    let stats = engine.index_stats();
    assert_eq!(stats.documents, 5);
    assert_eq!(stats.categories, 2);
    assert_eq!(stats.languages, 2);
}

#[test]
fn reload_from_sources() {
    let engine = quiet_engine();
    let report = engine
        .reload_from(&StaticSource::new(scenario_docs()))
        .unwrap();
    assert_eq!(report.indexed, 2);

    let dir = temp_dir();
    let path = dir.path().join("help.json");
    std::fs::write(&path, serde_json::to_string(&help_corpus()).unwrap()).unwrap();
    let report = engine.reload_from(&JsonFileSource::new(&path)).unwrap();
    assert_eq!(report.indexed, 5);
    assert_eq!(engine.document_count(), 7);

    let missing = JsonFileSource::new(dir.path().join("missing.json"));
    assert!(engine.reload_from(&missing).is_err());
    assert_eq!(engine.document_count(), 7);
}

#[test]
fn malformed_json_records_do_not_sink_the_batch() {
    let engine = quiet_engine();
    let dir = temp_dir();
    let path = dir.path().join("mixed.json");
    std::fs::write(
        &path,
        r#"[
            {"id":"h1","title":"Bubble Help","category":"gameplay"},
            {"id":null,"title":"Lost Bubble"},
            {"id":"h3","title":"Popular Tips","viewCount":"150"},
            {"id":"h4","title":42},
            {"id":"h5","content":{"body":"nested"}}
        ]"#,
    )
    .unwrap();

    let report = engine.reload_from(&JsonFileSource::new(&path)).unwrap();
    assert_eq!(report.indexed, 3);
    // null id skipped by the indexer, nested content rejected by the source
    assert_eq!(report.skipped, 2);
    assert_eq!(engine.document_count(), 3);

    let hits = engine.search("bubble", &SearchOptions::default());
    assert_eq!(ids(&hits), vec!["h1"]);
    assert_eq!(engine.get_document("h3").unwrap().view_count, Some(150));
    assert_eq!(engine.document_frequency("42"), 1);
}
