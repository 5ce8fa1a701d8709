//! Core types for helpsearch
//!
//! This crate defines the foundational types shared by the search engine:
//! - Document / Field: the help-content record and its weighted fields
//! - SearchOptions, SearchHit, Highlight, RelatedDocument: search API shapes
//! - PerformanceStats, IndexStats: monitoring snapshots
//! - EngineConfig: `helpsearch.toml` configuration
//! - PersistentStore: key/value persistence (in-memory and file-backed)
//! - ContentSource: suppliers of documents to index
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod document;
pub mod error;
pub mod search_types;
pub mod source;
pub mod store;

pub use config::{EngineConfig, FieldWeights, CONFIG_FILE_NAME, DEFAULT_HISTORY_KEY};
pub use document::{Document, Field};
pub use error::{Error, Result};
pub use search_types::{
    Highlight, IndexStats, PerformanceStats, PopularQuery, RelatedDocument, SearchHit,
    SearchOptions, SortBy, DEFAULT_LIMIT, DEFAULT_MIN_SCORE,
};
pub use source::{ContentSource, JsonFileSource, SourceBatch, StaticSource};
pub use store::{FileStore, InMemoryStore, PersistentStore};
