//! Inverted index and document store
//!
//! This module provides:
//! - PostingList: insertion-ordered, de-duplicated document ids for a term
//! - InvertedIndex: term -> PostingList, kept in a sorted map so term scans
//!   (substring expansion, suggestions) are deterministic
//! - DocumentStore: canonical document records keyed by id
//! - IndexSnapshot: an index/store pair that is built off to the side and
//!   published whole by the engine
//!
//! # Invariant
//!
//! A term is present in the index iff at least one stored document's
//! tokenized weighted field contains it. Re-indexing a document withdraws its
//! previous postings before adding the new ones. `prune_below` is the only
//! operation allowed to break the "if" direction, and it does so on purpose.

use crate::tokenizer::Tokenizer;
use helpsearch_core::{Document, FieldWeights, IndexStats};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use tracing::{debug, warn};

// ============================================================================
// PostingList
// ============================================================================

/// Documents containing a term, in first-indexed order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    doc_ids: Vec<String>,
}

impl PostingList {
    /// Create a new empty posting list
    pub fn new() -> Self {
        PostingList { doc_ids: vec![] }
    }

    /// Append a document id; returns false if it was already present
    pub fn add(&mut self, doc_id: &str) -> bool {
        if self.contains(doc_id) {
            return false;
        }
        self.doc_ids.push(doc_id.to_string());
        true
    }

    /// Remove a document id; returns true if it was present
    pub fn remove(&mut self, doc_id: &str) -> bool {
        let before = self.doc_ids.len();
        self.doc_ids.retain(|id| id != doc_id);
        before != self.doc_ids.len()
    }

    /// Whether the list contains a document id
    pub fn contains(&self, doc_id: &str) -> bool {
        self.doc_ids.iter().any(|id| id == doc_id)
    }

    /// Number of documents containing this term
    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    /// Check if posting list is empty
    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// Iterate document ids in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.doc_ids.iter().map(String::as_str)
    }
}

// ============================================================================
// InvertedIndex
// ============================================================================

/// Term -> posting list mapping
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: BTreeMap<String, PostingList>,
}

impl InvertedIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `doc_id` contains `term`
    pub fn add(&mut self, term: &str, doc_id: &str) {
        match self.postings.get_mut(term) {
            Some(list) => {
                list.add(doc_id);
            }
            None => {
                let mut list = PostingList::new();
                list.add(doc_id);
                self.postings.insert(term.to_string(), list);
            }
        }
    }

    /// Withdraw `doc_id` from the given terms, dropping emptied terms
    pub fn remove_document<'a, I>(&mut self, doc_id: &str, terms: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for term in terms {
            let emptied = match self.postings.get_mut(term.as_str()) {
                Some(list) => {
                    list.remove(doc_id);
                    list.is_empty()
                }
                None => false,
            };
            if emptied {
                self.postings.remove(term.as_str());
            }
        }
    }

    /// Posting list for a term
    pub fn lookup(&self, term: &str) -> Option<&PostingList> {
        self.postings.get(term)
    }

    /// Posting-list length for a term; 0 if absent
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, PostingList::len)
    }

    /// All indexed terms in sorted order
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    /// Indexed terms starting with `prefix`, in sorted order
    pub fn terms_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.postings
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .map(|(term, _)| term.as_str())
            .take_while(move |term| term.starts_with(prefix))
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Check if the index holds no terms
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Drop terms whose posting list is shorter than `min_frequency`
    ///
    /// Returns the number of terms removed.
    pub fn prune_below(&mut self, min_frequency: usize) -> usize {
        let before = self.postings.len();
        self.postings.retain(|_, list| list.len() >= min_frequency);
        before - self.postings.len()
    }

    /// Clear all index data
    pub fn clear(&mut self) {
        self.postings.clear();
    }
}

// ============================================================================
// DocumentStore
// ============================================================================

/// Canonical document records keyed by id
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    docs: FxHashMap<String, Document>,
}

impl DocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or overwrite a document, returning the previous record
    pub fn insert(&mut self, doc: Document) -> Option<Document> {
        self.docs.insert(doc.id.clone(), doc)
    }

    /// Look up a document
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.docs.get(id)
    }

    /// Whether a document is stored
    pub fn contains(&self, id: &str) -> bool {
        self.docs.contains_key(id)
    }

    /// Iterate stored documents (unordered)
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.values()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Remove every document
    pub fn clear(&mut self) {
        self.docs.clear();
    }
}

// ============================================================================
// IndexSnapshot
// ============================================================================

/// A consistent index/document-store pair
///
/// The engine never mutates a published snapshot. Writers clone the current
/// one, apply their changes, and swap the result in.
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    index: InvertedIndex,
    documents: DocumentStore,
    /// Terms each document contributed, for withdrawal on re-index
    doc_terms: FxHashMap<String, Vec<String>>,
    /// Bumped on every published change
    generation: u64,
}

impl IndexSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// The inverted index
    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// The document store
    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Generation counter
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// An empty snapshot that still supersedes this one
    pub(crate) fn cleared(&self) -> Self {
        IndexSnapshot {
            generation: self.generation.wrapping_add(1),
            ..Self::default()
        }
    }

    /// Index (or re-index) a single document
    ///
    /// Documents without an id are skipped with a warning; returns whether
    /// the document was indexed.
    pub fn index_document(
        &mut self,
        doc: Document,
        weights: &FieldWeights,
        tokenizer: &Tokenizer,
    ) -> bool {
        if !doc.has_id() {
            warn!(
                title = doc.title.as_deref().unwrap_or(""),
                "skipping document without id"
            );
            return false;
        }

        if let Some(previous) = self.doc_terms.remove(&doc.id) {
            debug!(id = %doc.id, "re-indexing document");
            self.index.remove_document(&doc.id, previous.iter());
        }

        let mut seen = FxHashSet::default();
        let mut terms = Vec::new();
        for (field, _) in weights.iter() {
            let Some(text) = doc.field_text(field) else {
                continue;
            };
            for term in tokenizer.tokenize(&text) {
                self.index.add(&term, &doc.id);
                if seen.insert(term.clone()) {
                    terms.push(term);
                }
            }
        }

        self.doc_terms.insert(doc.id.clone(), terms);
        self.documents.insert(doc);
        true
    }

    /// Drop terms with fewer than `min_frequency` postings
    pub fn optimize(&mut self, min_frequency: usize) -> usize {
        let removed = self.index.prune_below(min_frequency);
        if removed > 0 {
            for terms in self.doc_terms.values_mut() {
                terms.retain(|t| self.index.lookup(t).is_some());
            }
        }
        removed
    }

    /// `(category, count)` pairs, optionally restricted to one language,
    /// sorted by count descending then name
    pub fn categories(&self, language: Option<&str>) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in self.documents.iter() {
            if let Some(lang) = language {
                if doc.language.as_deref() != Some(lang) {
                    continue;
                }
            }
            if let Some(category) = doc.category.as_deref() {
                *counts.entry(category).or_insert(0) += 1;
            }
        }
        let mut out: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(c, n)| (c.to_string(), n))
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }

    /// Index shape statistics
    pub fn stats(&self) -> IndexStats {
        let mut categories = FxHashSet::default();
        let mut languages = FxHashSet::default();
        for doc in self.documents.iter() {
            if let Some(c) = doc.category.as_deref() {
                categories.insert(c);
            }
            if let Some(l) = doc.language.as_deref() {
                languages.insert(l);
            }
        }
        IndexStats {
            terms: self.index.len(),
            documents: self.documents.len(),
            categories: categories.len(),
            languages: languages.len(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
