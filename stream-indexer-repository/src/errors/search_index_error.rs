//! Search index error types.
//!
//! This module defines the unified error type for all search index operations.
//! Every variant is a transport-level failure from the synchronizer's point of
//! view: the batch is failed and redelivered by the stream runtime.

use thiserror::Error;

/// Unified errors from search index operations.
///
/// Used by the `SearchIndexProvider` trait and its implementations. Per-document
/// rejections inside a bulk request are not errors at this level; they are
/// reported through `BulkResponse`.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Failed to establish connection to the search index backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to check whether the index exists.
    #[error("Index existence check error: {0}")]
    IndexExistsError(String),

    /// Failed to create the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// The bulk request as a whole was rejected or could not be sent.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// Failed to parse response from search index backend.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to load signing configuration or credentials.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SearchIndexError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index existence check error.
    pub fn index_exists(msg: impl Into<String>) -> Self {
        Self::IndexExistsError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a bulk index error.
    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
