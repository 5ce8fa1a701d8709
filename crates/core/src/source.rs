//! Content sources supplying documents to the indexer
//!
//! The engine does not fetch content itself; whoever owns the help payloads
//! implements `ContentSource` and decides when a reload is due.

use crate::document::Document;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Documents produced by one load, plus the records that could not be read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceBatch {
    /// Converted documents, in source order
    pub documents: Vec<Document>,
    /// Records dropped before reaching the indexer
    pub rejected: usize,
}

/// Supplier of a full document batch
pub trait ContentSource: Send + Sync {
    /// Produce the complete current corpus
    fn load(&self) -> Result<Vec<Document>>;

    /// Produce the corpus along with a count of unreadable records
    ///
    /// Sources that parse records one by one override this; the default
    /// reports no rejections.
    fn load_batch(&self) -> Result<SourceBatch> {
        Ok(SourceBatch {
            documents: self.load()?,
            rejected: 0,
        })
    }

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

/// Fixed in-memory corpus
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: Vec<Document>,
}

impl StaticSource {
    /// Wrap a document batch
    pub fn new(documents: Vec<Document>) -> Self {
        StaticSource { documents }
    }
}

impl ContentSource for StaticSource {
    fn load(&self) -> Result<Vec<Document>> {
        Ok(self.documents.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// JSON file holding an array of documents
///
/// Records are converted one at a time with [`Document::from_json_value`];
/// a record that cannot be converted is logged and skipped, and the rest of
/// the file still loads.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Read documents from `path` on every load
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonFileSource {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ContentSource for JsonFileSource {
    fn load(&self) -> Result<Vec<Document>> {
        Ok(self.load_batch()?.documents)
    }

    fn load_batch(&self) -> Result<SourceBatch> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::SourceError(format!("failed to read '{}': {}", self.path.display(), e))
        })?;
        let records: Vec<serde_json::Value> = serde_json::from_str(&raw).map_err(|e| {
            Error::SourceError(format!("failed to parse '{}': {}", self.path.display(), e))
        })?;

        let mut batch = SourceBatch::default();
        for (position, record) in records.into_iter().enumerate() {
            match Document::from_json_value(record) {
                Ok(doc) => batch.documents.push(doc),
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        position,
                        error = %e,
                        "skipping malformed record"
                    );
                    batch.rejected += 1;
                }
            }
        }
        Ok(batch)
    }

    fn name(&self) -> &str {
        "json-file"
    }
}
