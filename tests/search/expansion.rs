//! Synonym and partial-match expansion.

use crate::common::*;

#[test]
fn japanese_synonym_finds_english_document() {
    let engine = quiet_engine();
    engine.index_content(help_corpus());

    let hits = engine.search("泡", &SearchOptions::default());
    assert!(ids(&hits).contains(&"basics"), "got {:?}", ids(&hits));
}

#[test]
fn english_synonym_of_canonical_term() {
    let engine = quiet_engine();
    engine.index_content(help_corpus());

    // "points" is listed under "score"; "scoring" mentions points directly
    let hits = engine.search("points", &SearchOptions::new().with_min_score(0.0));
    assert_eq!(hits[0].id(), "scoring");
}

#[test]
fn partial_token_matches_longer_terms() {
    let engine = quiet_engine();
    engine.index_content(help_corpus());

    let hits = engine.search("bubb", &SearchOptions::default());
    assert_eq!(ids(&hits), vec!["basics"]);
}

#[test]
fn short_tokens_do_not_expand() {
    let engine = quiet_engine();
    engine.index_content(help_corpus());

    // two characters: no substring scan, and "bu" is not itself a term
    assert!(engine.search("bu", &SearchOptions::new().with_min_score(0.0)).is_empty());
}

#[test]
fn custom_synonyms_from_config() {
    let config = EngineConfig::default().with_synonyms("volume", ["loudness"]);
    let engine = engine_with(config);
    engine.index_content(help_corpus());

    let hits = engine.search("loudness", &SearchOptions::new().with_min_score(0.0));
    assert_eq!(ids(&hits), vec!["audio"]);
}
