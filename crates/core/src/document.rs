//! Help/tutorial/FAQ document model
//!
//! This module defines:
//! - Document: a searchable content record with known optional fields
//! - Field: the closed set of fields the index knows how to weight
//!
//! Content payloads are heterogeneous, so anything outside the known fields
//! is kept in `Document::extra` and round-trips through serde untouched.
//! Extra fields are never indexed.

use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Field
// ============================================================================

/// A weighted, indexable document field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Document title
    Title,
    /// Curated keyword list
    SearchKeywords,
    /// Category label
    Category,
    /// Body text
    Content,
}

impl Field {
    /// All indexable fields, heaviest first
    pub const ALL: [Field; 4] = [
        Field::Title,
        Field::SearchKeywords,
        Field::Category,
        Field::Content,
    ];

    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::SearchKeywords => "searchKeywords",
            Field::Category => "category",
            Field::Content => "content",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Document
// ============================================================================

/// A searchable help document
///
/// Identity is `id`. A document with an empty `id` is treated as malformed
/// and skipped by the indexer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique identifier
    #[serde(default)]
    pub id: String,

    /// Title text (weighted heaviest)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Curated search keywords
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_keywords: Option<Vec<String>>,

    /// Category label used for filtering and related content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Language tag (e.g. "en", "ja")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Last modification time (recency bonus)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,

    /// View counter (popularity bonus)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,

    /// Fields this model does not know about
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Document {
    /// Create a document with only an id
    pub fn new(id: impl Into<String>) -> Self {
        Document {
            id: id.into(),
            ..Document::default()
        }
    }

    /// Builder: set title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder: set content
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Builder: set search keywords
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    /// Builder: set category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Builder: set language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builder: set last update time
    pub fn with_last_updated(mut self, ts: DateTime<Utc>) -> Self {
        self.last_updated = Some(ts);
        self
    }

    /// Builder: set view count
    pub fn with_view_count(mut self, count: u64) -> Self {
        self.view_count = Some(count);
        self
    }

    /// Builder: attach an extra, non-indexed field
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Whether the document carries a usable identifier
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Text of a weighted field, if present
    ///
    /// Keyword lists are rendered space-separated so each keyword tokenizes
    /// on its own.
    pub fn field_text(&self, field: Field) -> Option<Cow<'_, str>> {
        match field {
            Field::Title => self.title.as_deref().map(Cow::Borrowed),
            Field::Content => self.content.as_deref().map(Cow::Borrowed),
            Field::Category => self.category.as_deref().map(Cow::Borrowed),
            Field::SearchKeywords => self
                .search_keywords
                .as_ref()
                .map(|kws| Cow::Owned(kws.join(" "))),
        }
    }

    /// Text used for related-content similarity: `title + " " + content`
    pub fn similarity_text(&self) -> String {
        format!(
            "{} {}",
            self.title.as_deref().unwrap_or(""),
            self.content.as_deref().unwrap_or("")
        )
    }
}

// ============================================================================
// Lenient conversion
// ============================================================================

impl Document {
    /// Build a document from a loosely typed JSON record
    ///
    /// Content files are hand-edited, so scalar `id`, `title`, `content`,
    /// `category` and `language` values are rendered to strings, a lone
    /// string is accepted for `searchKeywords`, and `viewCount` may be a
    /// numeric string. An unreadable `lastUpdated` or `viewCount` is dropped
    /// rather than rejecting the record. A missing or null `id` yields a
    /// document without an id, which the indexer skips.
    ///
    /// # Errors
    ///
    /// `Error::InvalidDocument` when the record is not an object or a text
    /// field holds an array or object.
    pub fn from_json_value(value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::InvalidDocument(format!(
                    "expected an object, found {}",
                    json_kind(&other)
                )))
            }
        };

        let mut doc = Document::default();
        for (key, value) in map {
            match key.as_str() {
                "id" => doc.id = scalar_text(&key, value)?.unwrap_or_default(),
                "title" => doc.title = scalar_text(&key, value)?,
                "content" => doc.content = scalar_text(&key, value)?,
                "category" => doc.category = scalar_text(&key, value)?,
                "language" => doc.language = scalar_text(&key, value)?,
                "searchKeywords" => doc.search_keywords = keyword_list(value)?,
                "lastUpdated" => doc.last_updated = timestamp(&value),
                "viewCount" => doc.view_count = count(&value),
                _ => {
                    doc.extra.insert(key, value);
                }
            }
        }
        Ok(doc)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn scalar_text(field: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(Error::InvalidDocument(format!(
            "field '{}' must be text, found {}",
            field,
            json_kind(&other)
        ))),
    }
}

fn keyword_list(value: Value) -> Result<Option<Vec<String>>> {
    match value {
        Value::Array(items) => {
            let mut keywords = Vec::with_capacity(items.len());
            for item in items {
                if let Some(kw) = scalar_text("searchKeywords", item)? {
                    keywords.push(kw);
                }
            }
            Ok(Some(keywords))
        }
        other => Ok(scalar_text("searchKeywords", other)?.map(|kw| vec![kw])),
    }
}

/// RFC 3339 string or epoch milliseconds
fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|ts| ts.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

fn count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
