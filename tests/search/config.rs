//! Engine configuration from `helpsearch.toml`.

use crate::common::*;
use helpsearch::{Error, CONFIG_FILE_NAME};

#[test]
fn default_file_loads_as_default_config() {
    let dir = temp_dir();
    let path = dir.path().join(CONFIG_FILE_NAME);
    EngineConfig::write_default_if_missing(&path).unwrap();

    let engine = SearchEngine::builder()
        .config_file(&path)
        .unwrap()
        .without_background()
        .build()
        .unwrap();
    assert_eq!(engine.config(), &EngineConfig::default());
}

#[test]
fn file_overrides_apply() {
    let dir = temp_dir();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        r#"
default_limit = 1
stop_words = ["bubble"]

[field_weights]
title = 10.0
"#,
    )
    .unwrap();

    let engine = SearchEngine::builder()
        .config_file(&path)
        .unwrap()
        .without_background()
        .build()
        .unwrap();
    assert_eq!(engine.config().default_limit, 1);
    assert_eq!(engine.config().field_weights.title, 10.0);
    assert_eq!(engine.config().field_weights.content, 1.0);

    engine.index_content(help_corpus());
    // "bubble" is now a stop word
    assert_eq!(engine.document_frequency("bubble"), 0);
    assert!(engine.search("bubble", &SearchOptions::default()).is_empty());
    assert!(engine.search("pop", &SearchOptions::new().with_min_score(0.0)).len() <= 1);
}

#[test]
fn invalid_weight_is_rejected() {
    let dir = temp_dir();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[field_weights]\ntitle = -1.0\n").unwrap();

    let err = SearchEngine::builder().config_file(&path).err().unwrap();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn missing_file_is_an_error() {
    let dir = temp_dir();
    let result = SearchEngine::builder().config_file(&dir.path().join("absent.toml"));
    assert!(matches!(result.err(), Some(Error::InvalidConfig(_))));
}
