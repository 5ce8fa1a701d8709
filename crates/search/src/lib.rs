//! Full-text search for in-app help content
//!
//! This crate provides:
//! - Tokenizer with configurable stop words
//! - InvertedIndex, DocumentStore and the swappable IndexSnapshot
//! - QueryExpander for synonym and partial-term expansion
//! - Scorer trait and the WeightedTfIdfScorer default
//! - ResultCache: TTL- and size-bounded FIFO cache of ranked results
//! - MaintenanceWorker for periodic cache sweeps and history saves
//! - SearchEngine orchestrating indexing, search, suggestions and stats
//!
//! # Usage
//!
//! ```
//! use helpsearch_core::{Document, EngineConfig, SearchOptions};
//! use helpsearch_search::SearchEngine;
//!
//! let engine = SearchEngine::new(EngineConfig::default()).unwrap();
//! engine.index_content(vec![
//!     Document::new("h1").with_title("Bubble Help").with_category("gameplay"),
//!     Document::new("h2").with_title("Score Help").with_category("gameplay"),
//! ]);
//!
//! let hits = engine.search("bubble", &SearchOptions::default());
//! assert_eq!(hits[0].id(), "h1");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod background;
pub mod cache;
pub mod engine;
pub mod expander;
pub mod highlight;
pub mod index;
pub mod scorer;
pub mod similarity;
pub mod stats;
pub mod tokenizer;

// Re-export commonly used types
pub use background::{BackpressureError, MaintenanceStats, MaintenanceWorker};
pub use cache::ResultCache;
pub use engine::{IndexReport, SearchEngine, SearchEngineBuilder};
pub use expander::{QueryExpander, SynonymTable};
pub use index::{DocumentStore, IndexSnapshot, InvertedIndex, PostingList};
pub use scorer::{Scorer, ScorerContext, WeightedTfIdfScorer};
pub use stats::{RecentQuery, SearchHistory, SearchStats};
pub use tokenizer::Tokenizer;
