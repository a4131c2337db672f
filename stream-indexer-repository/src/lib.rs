//! # Stream Indexer Repository
//!
//! This crate provides traits and implementations for interacting with the
//! search index. It includes definitions for errors, the bulk request and
//! response model, and a concrete implementation for OpenSearch.

pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::{IndexConfig, OpenSearchProvider, SigningConfig, SigningService};
pub use types::{BulkAction, BulkItemResult, BulkOperation, BulkResponse, CreateIndexOutcome};
