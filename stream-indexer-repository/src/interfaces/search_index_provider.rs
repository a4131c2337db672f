//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;

use crate::errors::SearchIndexError;
use crate::types::{BulkOperation, BulkResponse, CreateIndexOutcome};

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are injected into the synchronizer to enable dependency injection and
/// easy testing with mock implementations. Each provider targets exactly one index.
///
/// All methods return `Result<T, SearchIndexError>` for consistent error handling across
/// different backend implementations.
///
/// # Index Initialization
///
/// `index_exists` and `create_index` are deliberately separate calls. Callers check first
/// and create when absent; because that pair is not atomic, `create_index` must report a
/// concurrent creation as `CreateIndexOutcome::AlreadyExists` instead of failing.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Name of the index this provider writes to.
    fn index_name(&self) -> &str;

    /// Check whether the target index exists.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the index exists
    /// * `Ok(false)` - If the index does not exist
    /// * `Err(SearchIndexError)` - If the check could not be performed
    async fn index_exists(&self) -> Result<bool, SearchIndexError>;

    /// Create the target index with its minimal mapping.
    ///
    /// # Returns
    ///
    /// * `Ok(CreateIndexOutcome::Created)` - If this call created the index
    /// * `Ok(CreateIndexOutcome::AlreadyExists)` - If the index was created concurrently
    /// * `Err(SearchIndexError)` - If creation failed for any other reason
    async fn create_index(&self) -> Result<CreateIndexOutcome, SearchIndexError>;

    /// Submit all operations as a single bulk request with refresh requested.
    ///
    /// The response holds one item per operation, in submission order. Rejected
    /// operations show up as failed items, not as an `Err`.
    ///
    /// # Arguments
    ///
    /// * `operations` - Ordered index and delete operations
    ///
    /// # Returns
    ///
    /// * `Ok(BulkResponse)` - Per-operation outcomes
    /// * `Err(SearchIndexError)` - If the request could not be sent or was rejected as a whole
    async fn bulk(&self, operations: &[BulkOperation]) -> Result<BulkResponse, SearchIndexError>;
}
