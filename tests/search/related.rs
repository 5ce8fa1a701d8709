//! Related content and the Jaccard measure behind it.

use crate::common::*;
use helpsearch::similarity::jaccard;
use proptest::prelude::*;
use std::collections::HashSet;

#[test]
fn related_stays_within_category() {
    let engine = quiet_engine();
    engine.index_content(help_corpus());

    let related = engine.get_related_content("basics");
    assert!(!related.is_empty());
    assert!(related.len() <= 5);
    for r in &related {
        assert_ne!(r.id(), "basics");
        assert_eq!(r.document.category.as_deref(), Some("gameplay"));
    }
    for pair in related.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
}

#[test]
fn related_respects_max_related() {
    let config = EngineConfig {
        max_related: 1,
        ..EngineConfig::default()
    };
    let engine = engine_with(config);
    engine.index_content(help_corpus());
    assert_eq!(engine.get_related_content("basics").len(), 1);
}

#[test]
fn related_of_unknown_or_uncategorized_is_empty() {
    let engine = quiet_engine();
    engine.index_content(vec![Document::new("loose").with_title("No category")]);
    assert!(engine.get_related_content("loose").is_empty());
    assert!(engine.get_related_content("nope").is_empty());
}

#[test]
fn jaccard_of_empty_sets_is_zero() {
    let empty: HashSet<String> = HashSet::new();
    assert_eq!(jaccard(&empty, &empty), 0.0);
}

proptest! {
    #[test]
    fn jaccard_is_symmetric(
        a in proptest::collection::hash_set("[a-z]{2,4}", 0..10),
        b in proptest::collection::hash_set("[a-z]{2,4}", 0..10),
    ) {
        prop_assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
    }
}
