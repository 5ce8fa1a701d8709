//! Engine configuration via `helpsearch.toml`
//!
//! Every setting has a default, so an empty file (or no file at all) yields a
//! working engine. Missing tables such as `[synonyms]` fall back to the
//! built-in tables below.

use crate::document::Field;
use crate::error::{Error, Result};
use crate::search_types::{DEFAULT_LIMIT, DEFAULT_MIN_SCORE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "helpsearch.toml";

/// Store key under which search history is persisted
pub const DEFAULT_HISTORY_KEY: &str = "search_history";

// ============================================================================
// FieldWeights
// ============================================================================

/// Per-field score multipliers
///
/// Every weight must be positive and finite (see [`EngineConfig::validate`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldWeights {
    /// Title multiplier
    #[serde(default = "default_title_weight")]
    pub title: f64,
    /// Search keyword multiplier
    #[serde(default = "default_keywords_weight")]
    pub search_keywords: f64,
    /// Category multiplier
    #[serde(default = "default_category_weight")]
    pub category: f64,
    /// Body text multiplier
    #[serde(default = "default_content_weight")]
    pub content: f64,
}

fn default_title_weight() -> f64 {
    3.0
}

fn default_keywords_weight() -> f64 {
    2.0
}

fn default_category_weight() -> f64 {
    1.5
}

fn default_content_weight() -> f64 {
    1.0
}

impl Default for FieldWeights {
    fn default() -> Self {
        FieldWeights {
            title: default_title_weight(),
            search_keywords: default_keywords_weight(),
            category: default_category_weight(),
            content: default_content_weight(),
        }
    }
}

impl FieldWeights {
    /// Weight for a field
    pub fn weight(&self, field: Field) -> f64 {
        match field {
            Field::Title => self.title,
            Field::SearchKeywords => self.search_keywords,
            Field::Category => self.category,
            Field::Content => self.content,
        }
    }

    /// `(field, weight)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        Field::ALL.iter().map(move |&f| (f, self.weight(f)))
    }
}

// ============================================================================
// Built-in tables
// ============================================================================

/// Built-in synonym table: canonical term -> equivalents
pub fn default_synonyms() -> BTreeMap<String, Vec<String>> {
    let table: &[(&str, &[&str])] = &[
        ("bubble", &["泡", "バブル", "ball"]),
        ("score", &["点数", "スコア", "points"]),
        ("combo", &["コンボ", "chain", "連鎖"]),
        ("settings", &["設定", "options", "config"]),
        ("help", &["ヘルプ", "guide", "助け"]),
        ("stage", &["ステージ", "level"]),
        ("item", &["アイテム", "powerup"]),
    ];
    table
        .iter()
        .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
        .collect()
}

/// Built-in stop-word list (Japanese particles and English function words)
pub fn default_stop_words() -> Vec<String> {
    [
        "の", "に", "は", "を", "が", "で", "と", "た", "て", "だ", "である", "です", "ます",
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "is", "are", "was", "were",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// ============================================================================
// EngineConfig
// ============================================================================

/// Search engine configuration loaded from `helpsearch.toml`.
///
/// # Example
///
/// ```toml
/// cache_timeout_ms = 300000
/// max_cache_size = 100
///
/// [field_weights]
/// title = 3.0
///
/// [synonyms]
/// bubble = ["泡", "バブル"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Result cache time-to-live in milliseconds
    #[serde(default = "default_cache_timeout_ms")]
    pub cache_timeout_ms: u64,
    /// Maximum number of cached result sets
    #[serde(default = "default_max_cache_size")]
    pub max_cache_size: usize,
    /// Result limit when `SearchOptions::limit` is unset
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Score threshold when `SearchOptions::min_score` is unset
    #[serde(default = "default_min_score")]
    pub default_min_score: f64,
    /// `optimize_index` drops terms with fewer postings than this
    #[serde(default = "default_min_term_frequency")]
    pub min_term_frequency: usize,
    /// Minimum query token length (chars) for substring expansion
    #[serde(default = "default_fuzzy_min_len")]
    pub fuzzy_min_len: usize,
    /// Suggestion cap
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    /// Related-content cap
    #[serde(default = "default_max_related")]
    pub max_related: usize,
    /// Interval of the background cache sweep in milliseconds
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
    /// Also run `optimize_index` on each sweep
    #[serde(default)]
    pub optimize_on_sweep: bool,
    /// Persistent store key for search history
    #[serde(default = "default_history_key")]
    pub history_key: String,
    /// Terms excluded from indexing and queries
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,
    /// Per-field score multipliers
    #[serde(default)]
    pub field_weights: FieldWeights,
    /// Synonym table: canonical term -> equivalents
    #[serde(default = "default_synonyms")]
    pub synonyms: BTreeMap<String, Vec<String>>,
}

fn default_cache_timeout_ms() -> u64 {
    5 * 60 * 1000
}

fn default_max_cache_size() -> usize {
    100
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_min_score() -> f64 {
    DEFAULT_MIN_SCORE
}

fn default_min_term_frequency() -> usize {
    2
}

fn default_fuzzy_min_len() -> usize {
    3
}

fn default_max_suggestions() -> usize {
    10
}

fn default_max_related() -> usize {
    5
}

fn default_sweep_interval_ms() -> u64 {
    60 * 1000
}

fn default_history_key() -> String {
    DEFAULT_HISTORY_KEY.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cache_timeout_ms: default_cache_timeout_ms(),
            max_cache_size: default_max_cache_size(),
            default_limit: default_limit(),
            default_min_score: default_min_score(),
            min_term_frequency: default_min_term_frequency(),
            fuzzy_min_len: default_fuzzy_min_len(),
            max_suggestions: default_max_suggestions(),
            max_related: default_max_related(),
            sweep_interval_ms: default_sweep_interval_ms(),
            optimize_on_sweep: false,
            history_key: default_history_key(),
            stop_words: default_stop_words(),
            field_weights: FieldWeights::default(),
            synonyms: default_synonyms(),
        }
    }
}

impl EngineConfig {
    /// Result cache time-to-live
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    /// Background sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Builder: set cache TTL
    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Builder: set cache capacity
    pub fn with_max_cache_size(mut self, size: usize) -> Self {
        self.max_cache_size = size;
        self
    }

    /// Builder: set sweep interval
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Builder: add a synonym group
    pub fn with_synonyms<S: Into<String>>(
        mut self,
        canonical: impl Into<String>,
        synonyms: impl IntoIterator<Item = S>,
    ) -> Self {
        self.synonyms.insert(
            canonical.into(),
            synonyms.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Check invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        for (field, weight) in self.field_weights.iter() {
            if !(weight.is_finite() && weight > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "field weight for '{}' must be positive and finite, got {}",
                    field, weight
                )));
            }
        }
        if self.max_cache_size == 0 {
            return Err(Error::InvalidConfig(
                "max_cache_size must be at least 1".to_string(),
            ));
        }
        if self.default_limit == 0 {
            return Err(Error::InvalidConfig(
                "default_limit must be at least 1".to_string(),
            ));
        }
        if !self.default_min_score.is_finite() || self.default_min_score < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "default_min_score must be finite and >= 0, got {}",
                self.default_min_score
            )));
        }
        if self.sweep_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "sweep_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.history_key.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "history_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            Error::InvalidConfig(msg) => Error::InvalidConfig(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                msg
            )),
            other => other,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# helpsearch configuration

# Result cache time-to-live in milliseconds (default: 5 minutes)
cache_timeout_ms = 300000

# Maximum number of cached result sets; the oldest insertion is evicted first
max_cache_size = 100

# Defaults applied when a search call leaves limit / minScore unset
default_limit = 20
default_min_score = 0.1

# optimize_index() drops terms found in fewer documents than this
min_term_frequency = 2

# Query tokens at least this many characters long get substring expansion
fuzzy_min_len = 3

max_suggestions = 10
max_related = 5

# Background sweep of expired cache entries (milliseconds)
sweep_interval_ms = 60000
optimize_on_sweep = false

# Persistent store key for popular queries
history_key = "search_history"

# Uncomment to replace the built-in stop-word list.
# stop_words = ["the", "a", "an"]

[field_weights]
title = 3.0
search_keywords = 2.0
category = 1.5
content = 1.0

# Uncomment to replace the built-in synonym table.
# [synonyms]
# bubble = ["泡", "バブル", "ball"]

"#
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
            info!(path = %path.display(), "wrote default config");
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
