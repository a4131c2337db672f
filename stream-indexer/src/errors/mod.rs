//! Error types for the stream indexer.

use std::fmt;

use stream_indexer_repository::SearchIndexError;
use thiserror::Error;

use crate::synchronizer::BulkFailureReport;

/// Why a change event could not be turned into an index operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// A REMOVE event whose key has no usable `id`.
    MissingKeyId,
    /// An INSERT or MODIFY event without a new image.
    MissingNewImage,
    /// An INSERT or MODIFY event whose new image has no usable `id`.
    MissingImageId,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::MissingKeyId => "key has no usable id",
            Self::MissingNewImage => "event has no new image",
            Self::MissingImageId => "new image has no usable id",
        };
        f.write_str(reason)
    }
}

/// Errors that can occur while synchronizing a batch.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A single event could not be translated. Recovered locally: the event is
    /// dropped and the batch continues.
    #[error("Malformed event {}: {}", .event_id.as_deref().unwrap_or("<unknown>"), .reason)]
    MalformedEvent {
        event_id: Option<String>,
        reason: DropReason,
    },

    /// The index rejected one or more operations of the bulk request.
    #[error("Failed to index all documents: {} of {} operations failed", .0.failures.len(), .0.total)]
    BulkPartialFailure(BulkFailureReport),

    /// The index could not be reached, checked, created or written to.
    #[error("Transport failure: {0}")]
    TransportFailure(#[from] SearchIndexError),
}

impl SyncError {
    /// Create a malformed event error.
    pub fn malformed(event_id: Option<String>, reason: DropReason) -> Self {
        Self::MalformedEvent { event_id, reason }
    }
}

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Synchronization error.
    #[error("Sync error: {0}")]
    SyncError(#[from] SyncError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_event_display() {
        let err = SyncError::malformed(Some("evt-1".to_string()), DropReason::MissingKeyId);
        assert_eq!(err.to_string(), "Malformed event evt-1: key has no usable id");

        let err = SyncError::malformed(None, DropReason::MissingNewImage);
        assert_eq!(
            err.to_string(),
            "Malformed event <unknown>: event has no new image"
        );
    }

    #[test]
    fn test_transport_failure_from_search_index_error() {
        let err: SyncError = SearchIndexError::connection("refused").into();
        assert!(matches!(err, SyncError::TransportFailure(_)));
        assert_eq!(err.to_string(), "Transport failure: Connection error: refused");
    }

    #[test]
    fn test_sync_error_wraps_into_indexing_error() {
        let err: IndexingError = SyncError::malformed(None, DropReason::MissingKeyId).into();
        assert!(matches!(err, IndexingError::SyncError(SyncError::MalformedEvent { .. })));
        assert_eq!(
            err.to_string(),
            "Sync error: Malformed event <unknown>: key has no usable id"
        );
    }
}
