//! helpsearch - embedded full-text search for in-app help content
//!
//! Indexes help, tutorial and FAQ documents and answers free-text queries
//! with weighted TF-IDF ranking, synonym expansion, highlights, suggestions
//! and related-content lookup. Results are cached per query and options.
//!
//! # Quick Start
//!
//! ```
//! use helpsearch::{Document, EngineConfig, SearchEngine, SearchOptions};
//!
//! let engine = SearchEngine::new(EngineConfig::default()).unwrap();
//! engine.index_content(vec![
//!     Document::new("h1").with_title("Bubble Help").with_category("gameplay"),
//!     Document::new("h2").with_title("Score Help").with_category("gameplay"),
//! ]);
//!
//! let hits = engine.search("bubble", &SearchOptions::default());
//! assert_eq!(hits[0].id(), "h1");
//!
//! let related = engine.get_related_content("h1");
//! assert_eq!(related[0].id(), "h2");
//! ```
//!
//! # Architecture
//!
//! - `helpsearch-core`: document model, options, configuration, errors,
//!   persistence and content-source traits
//! - `helpsearch-search`: tokenizer, index, expansion, scoring, cache,
//!   maintenance worker and the [`SearchEngine`] orchestrator

pub use helpsearch_core::*;
pub use helpsearch_search::*;
