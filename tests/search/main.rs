//! Search Comprehensive Test Suite
//!
//! End-to-end behaviour of the `SearchEngine`:
//!
//! - **scenario**: the two-document gameplay walkthrough
//! - **queries**: blank queries, filters, ranking, highlights
//! - **caching**: TTL, hit accounting, size bound
//! - **indexing**: term presence, idempotence, optimization
//! - **expansion**: synonyms and partial matches
//! - **related**: related content and Jaccard properties
//! - **persistence**: popular-query history across engines
//! - **maintenance**: the background sweep
//! - **config**: `helpsearch.toml` loading
//! - **concurrency**: searches racing index swaps
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test search_comprehensive
//! cargo test --test search_comprehensive caching
//! ```

#[path = "../common/mod.rs"]
mod common;

mod caching;
mod concurrency;
mod config;
mod expansion;
mod indexing;
mod maintenance;
mod persistence;
mod related;
mod scenario;
