//! Core search types
//!
//! This module defines the request and response shapes of the search API:
//! - SearchOptions: filters and paging for a search call
//! - SearchHit: a ranked document with its score and highlights
//! - Highlight: a marked-up preview of one matched field
//! - RelatedDocument: a same-category document with its similarity
//! - PerformanceStats / IndexStats: engine monitoring snapshots

use crate::document::{Document, Field};
use serde::{Deserialize, Serialize};

/// Default minimum score for a hit to be returned
pub const DEFAULT_MIN_SCORE: f64 = 0.1;

/// Default maximum number of hits returned
pub const DEFAULT_LIMIT: usize = 20;

// ============================================================================
// SortBy
// ============================================================================

/// Result ordering
///
/// Every order falls back to relevance, then id, so equal keys rank
/// deterministically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Highest relevance score first
    #[default]
    Relevance,
    /// Most recently updated first; undated documents last
    Date,
    /// Most viewed first; a missing view count counts as zero
    Popularity,
}

impl SortBy {
    /// Whether this is the default order
    pub fn is_relevance(&self) -> bool {
        *self == SortBy::Relevance
    }
}

// ============================================================================
// SearchOptions
// ============================================================================

/// Filters and paging for a search call
///
/// Unset fields fall back to the engine configuration
/// (`default_min_score`, `default_limit`).
///
/// # Examples
///
/// ```
/// use helpsearch_core::SearchOptions;
///
/// let opts = SearchOptions::new()
///     .with_category("gameplay")
///     .with_limit(5);
/// assert_eq!(opts.limit, Some(5));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Exact category filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Exact language filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Hits scoring below this are dropped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,

    /// Maximum number of hits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Ordering applied before the limit
    #[serde(default, skip_serializing_if = "SortBy::is_relevance")]
    pub sort_by: SortBy,
}

impl SearchOptions {
    /// Create options with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: filter by category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Builder: filter by language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builder: set minimum score
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Builder: set result limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Builder: set result ordering
    pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Stable serialization used as part of the result-cache key
    ///
    /// Field order is fixed by the struct definition, so equal options
    /// always produce equal strings.
    pub fn cache_fragment(&self) -> String {
        // Serializing plain strings/numbers cannot fail; fall back to Debug anyway.
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

// ============================================================================
// Highlight
// ============================================================================

/// Marked-up preview of a matched field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    /// Field the match was found in
    pub field: Field,
    /// Query term that matched
    pub term: String,
    /// Text window around the first match, match wrapped in `<mark>`
    pub snippet: String,
}

// ============================================================================
// SearchHit
// ============================================================================

/// A ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// The matched document
    #[serde(flatten)]
    pub document: Document,
    /// Summed relevance score (finite, >= 0)
    pub relevance_score: f64,
    /// Per-field highlight markup
    pub highlights: Vec<Highlight>,
}

impl SearchHit {
    /// Identifier of the matched document
    pub fn id(&self) -> &str {
        &self.document.id
    }
}

// ============================================================================
// RelatedDocument
// ============================================================================

/// A document related to another through shared vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedDocument {
    /// The related document
    #[serde(flatten)]
    pub document: Document,
    /// Jaccard similarity in [0, 1]
    pub similarity: f64,
}

impl RelatedDocument {
    /// Identifier of the related document
    pub fn id(&self) -> &str {
        &self.document.id
    }
}

// ============================================================================
// Stats
// ============================================================================

/// A popular query and how often it was searched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularQuery {
    /// Normalized query text
    pub query: String,
    /// Number of searches
    pub count: u64,
}

/// Engine performance snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    /// Total search calls with a non-blank query
    pub total_searches: u64,
    /// Searches served from the result cache
    pub cache_hits: u64,
    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,
    /// Cumulative moving average search time in milliseconds
    pub average_search_time_ms: f64,
    /// Number of distinct indexed terms
    pub index_size: usize,
    /// Number of stored documents
    pub document_count: usize,
    /// Number of live result-cache entries
    pub cache_size: usize,
    /// Top popular queries, most frequent first
    pub popular_queries: Vec<PopularQuery>,
}

/// Index shape snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    /// Distinct indexed terms
    pub terms: usize,
    /// Stored documents
    pub documents: usize,
    /// Distinct categories
    pub categories: usize,
    /// Distinct languages
    pub languages: usize,
}
