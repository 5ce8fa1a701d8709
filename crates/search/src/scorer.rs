//! Relevance scoring
//!
//! This module provides:
//! - Scorer trait for pluggable scoring algorithms
//! - ScorerContext for corpus-level statistics
//! - WeightedTfIdfScorer default implementation
//!
//! A document's score for a query is the sum of `Scorer::score` over every
//! expanded query token whose posting list contains the document.

use chrono::{DateTime, Duration, Utc};
use helpsearch_core::{Document, FieldWeights};
use rustc_hash::FxHashMap;

// ============================================================================
// ScorerContext
// ============================================================================

/// Corpus-level statistics for one search
///
/// Built once per search from the index snapshot the search runs against.
#[derive(Debug, Clone)]
pub struct ScorerContext {
    /// Total documents in corpus (for IDF calculation)
    pub total_docs: usize,

    /// Document frequency per expanded term
    pub doc_freqs: FxHashMap<String, usize>,

    /// Reference time for recency calculations
    pub now: DateTime<Utc>,
}

impl ScorerContext {
    /// Create a new ScorerContext at the current time
    pub fn new(total_docs: usize) -> Self {
        ScorerContext {
            total_docs,
            doc_freqs: FxHashMap::default(),
            now: Utc::now(),
        }
    }

    /// Builder: pin the reference time
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Add document frequency for a term
    pub fn add_doc_freq(&mut self, term: &str, count: usize) {
        self.doc_freqs.insert(term.to_string(), count);
    }

    /// Document frequency for a term; 0 if unknown
    pub fn doc_freq(&self, term: &str) -> usize {
        self.doc_freqs.get(term).copied().unwrap_or(0)
    }

    /// Compute IDF for a term
    ///
    /// IDF(t) = ln(N / (df + 1)). The `+1` keeps unseen terms finite.
    /// Terms present in most documents get a negative IDF. Returns 0 for an
    /// empty corpus.
    pub fn idf(&self, term: &str) -> f64 {
        if self.total_docs == 0 {
            return 0.0;
        }
        let n = self.total_docs as f64;
        let df = self.doc_freq(term) as f64;
        (n / (df + 1.0)).ln()
    }
}

impl Default for ScorerContext {
    fn default() -> Self {
        Self::new(0)
    }
}

// ============================================================================
// Scorer Trait
// ============================================================================

/// Pluggable scoring interface
///
/// # Thread Safety
///
/// Scorers must be Send + Sync: concurrent searches share one scorer.
pub trait Scorer: Send + Sync {
    /// Score one document for one expanded query token
    ///
    /// `query` is the trimmed, lower-cased original query. Implementations
    /// must return a finite value ≥ 0.
    fn score(&self, token: &str, doc: &Document, query: &str, ctx: &ScorerContext) -> f64;

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

// ============================================================================
// WeightedTfIdfScorer
// ============================================================================

/// Bonus when the title contains the whole query
pub const EXACT_TITLE_BONUS: f64 = 2.0;

/// Bonus for documents updated within [`RECENT_DAYS`]
pub const RECENCY_BONUS: f64 = 0.5;

/// Recency window in days
pub const RECENT_DAYS: i64 = 30;

/// View count above which the popularity bonus applies
pub const POPULARITY_THRESHOLD: u64 = 100;

/// Multiplier on `ln(view_count / 100)`
pub const POPULARITY_FACTOR: f64 = 0.3;

/// Field-weighted TF-IDF with exact-match, recency and popularity bonuses
///
/// # Formula
///
/// For each weighted field present on the document:
///
/// ```text
/// tf           = occurrences(token, field) / chars(field)
/// contribution = tf * ln(N / (df + 1)) * weight(field)
/// ```
///
/// Plus: +2.0 if the title contains the full query, +0.5 if updated in the
/// last 30 days, `+0.3 * ln(views / 100)` if views > 100.
#[derive(Debug, Clone, Default)]
pub struct WeightedTfIdfScorer {
    weights: FieldWeights,
}

impl WeightedTfIdfScorer {
    /// Create a scorer with the given field weights
    pub fn new(weights: FieldWeights) -> Self {
        WeightedTfIdfScorer { weights }
    }

    /// Field weights in use
    pub fn weights(&self) -> &FieldWeights {
        &self.weights
    }

    fn field_score(&self, token: &str, doc: &Document, ctx: &ScorerContext) -> f64 {
        let idf = ctx.idf(token);
        let mut score = 0.0;
        for (field, weight) in self.weights.iter() {
            let Some(text) = doc.field_text(field) else {
                continue;
            };
            let text = text.to_lowercase();
            let len = text.chars().count();
            if len == 0 {
                continue;
            }
            let occurrences = text.matches(token).count();
            if occurrences == 0 {
                continue;
            }
            let tf = occurrences as f64 / len as f64;
            score += tf * idf * weight;
        }
        score
    }

    fn bonus(&self, doc: &Document, query: &str, ctx: &ScorerContext) -> f64 {
        let mut bonus = 0.0;

        if !query.is_empty() {
            if let Some(title) = &doc.title {
                if title.to_lowercase().contains(query) {
                    bonus += EXACT_TITLE_BONUS;
                }
            }
        }

        if let Some(updated) = doc.last_updated {
            if ctx.now.signed_duration_since(updated) < Duration::days(RECENT_DAYS) {
                bonus += RECENCY_BONUS;
            }
        }

        if let Some(views) = doc.view_count {
            if views > POPULARITY_THRESHOLD {
                bonus += (views as f64 / POPULARITY_THRESHOLD as f64).ln() * POPULARITY_FACTOR;
            }
        }

        bonus
    }
}

impl Scorer for WeightedTfIdfScorer {
    fn score(&self, token: &str, doc: &Document, query: &str, ctx: &ScorerContext) -> f64 {
        if token.is_empty() {
            return 0.0;
        }
        let score = self.field_score(token, doc, ctx) + self.bonus(doc, query, ctx);
        if score.is_finite() {
            score.max(0.0)
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        "weighted-tfidf"
    }
}

// ============================================================================
// Tests
// ============================================================================
