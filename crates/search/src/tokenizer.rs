//! Text tokenizer for indexing and queries
//!
//! Pipeline: lowercase → every non-word, non-space char becomes a space
//!           → split on whitespace runs → drop single-byte tokens → drop stopwords
//!
//! Word characters are Unicode alphanumerics plus `_`, so kana and kanji
//! survive alongside ASCII. The length filter counts UTF-8 bytes: a lone
//! ASCII letter is dropped, a lone ideograph such as "泡" is kept.

use rustc_hash::FxHashSet;

/// Tokenizer with a configurable stop-word set
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: FxHashSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer::new(helpsearch_core::config::default_stop_words())
    }
}

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl Tokenizer {
    /// Create a tokenizer; stop words are matched case-insensitively
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Tokenizer {
            stop_words: stop_words
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Check if a (lowercased) token is a stop word
    #[inline]
    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Tokenize text into searchable terms
    ///
    /// Never fails; empty or all-punctuation input yields an empty vec.
    ///
    /// # Example
    ///
    /// ```
    /// use helpsearch_search::Tokenizer;
    ///
    /// let tokens = Tokenizer::default().tokenize("How to pop the Bubbles!");
    /// assert_eq!(tokens, vec!["how", "pop", "bubbles"]);
    /// ```
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .map(|c| {
                if is_word_char(c) || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect();

        cleaned
            .split_whitespace()
            .filter(|s| s.len() > 1)
            .filter(|s| !self.is_stop_word(s))
            .map(String::from)
            .collect()
    }

    /// Tokenize and deduplicate, preserving first occurrence order
    pub fn tokenize_unique(&self, text: &str) -> Vec<String> {
        let mut seen = FxHashSet::default();
        self.tokenize(text)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }
}
