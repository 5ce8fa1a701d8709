//! Error types for helpsearch
//!
//! Search itself is total: `SearchEngine::search` never returns an error.
//! These errors surface only from fallible plumbing: configuration loading,
//! persistent stores and content sources.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for helpsearch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for helpsearch
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (config files, file-backed stores)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Document rejected at indexing time
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Persistent store failure
    #[error("Store error: {0}")]
    StoreError(String),

    /// Content source failed to produce documents
    #[error("Content source error: {0}")]
    SourceError(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
