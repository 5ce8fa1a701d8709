//! Query expansion
//!
//! Expands tokenized queries with:
//! - synonyms from a SynonymTable (looked up in both directions)
//! - partial matches against indexed terms (token ⊆ term or term ⊆ token)
//!
//! The partial-match pass is a linear scan of the index vocabulary per
//! eligible token. Matching is deliberately bidirectional, so a long token
//! can pull in every short term it contains.

use crate::index::InvertedIndex;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// SynonymTable
// ============================================================================

/// Synonym lookup built from `canonical -> equivalents` groups
///
/// Every member of a group maps to all other members, so "泡" expands to
/// "bubble" just as "bubble" expands to "泡".
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    groups: BTreeMap<String, Vec<String>>,
    lookup: FxHashMap<String, Vec<String>>,
}

impl SynonymTable {
    /// Build from canonical groups; all terms are lower-cased
    pub fn new(groups: &BTreeMap<String, Vec<String>>) -> Self {
        let mut normalized: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut lookup: FxHashMap<String, Vec<String>> = FxHashMap::default();

        for (canonical, synonyms) in groups {
            let canonical = canonical.trim().to_lowercase();
            if canonical.is_empty() {
                continue;
            }
            let synonyms: Vec<String> = synonyms
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty() && *s != canonical)
                .collect();

            let mut members = vec![canonical.clone()];
            members.extend(synonyms.iter().cloned());
            for member in &members {
                let entry = lookup.entry(member.clone()).or_default();
                for other in &members {
                    if other != member && !entry.contains(other) {
                        entry.push(other.clone());
                    }
                }
            }
            normalized.entry(canonical).or_default().extend(synonyms);
        }

        SynonymTable {
            groups: normalized,
            lookup,
        }
    }

    /// Equivalents of a term (empty when it has none)
    pub fn synonyms_of(&self, term: &str) -> &[String] {
        self.lookup.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every canonical key and synonym value, each once, in sorted order
    pub fn all_terms(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        for (canonical, synonyms) in &self.groups {
            out.insert(canonical.as_str());
            out.extend(synonyms.iter().map(String::as_str));
        }
        out
    }

    /// Number of canonical groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if the table has no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// ============================================================================
// QueryExpander
// ============================================================================

/// Expands query tokens with synonyms and partial index matches
#[derive(Debug, Clone)]
pub struct QueryExpander {
    synonyms: SynonymTable,
    /// Minimum token length in chars for partial matching
    fuzzy_min_len: usize,
}

impl QueryExpander {
    /// Create an expander
    pub fn new(synonyms: SynonymTable, fuzzy_min_len: usize) -> Self {
        QueryExpander {
            synonyms,
            fuzzy_min_len,
        }
    }

    /// The synonym table in use
    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    /// Expand tokens into the set of terms to look up
    ///
    /// The result always contains the original tokens.
    pub fn expand(&self, tokens: &[String], index: &InvertedIndex) -> BTreeSet<String> {
        let mut expanded: BTreeSet<String> = tokens.iter().cloned().collect();

        for token in tokens {
            expanded.extend(self.synonyms.synonyms_of(token).iter().cloned());

            if token.chars().count() >= self.fuzzy_min_len {
                for term in index.terms() {
                    if term.contains(token.as_str()) || token.contains(term) {
                        expanded.insert(term.to_string());
                    }
                }
            }
        }

        expanded
    }
}
