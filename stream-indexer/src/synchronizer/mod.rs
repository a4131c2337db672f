//! Synchronizer module for the stream indexer.
//!
//! Applies one batch of change events to the search index.

mod result;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use stream_indexer_repository::{BulkOperation, CreateIndexOutcome, SearchIndexProvider};
use stream_indexer_shared::ChangeEvent;
use tracing::{debug, instrument};

use crate::diagnostics::{DiagnosticEvent, DiagnosticSink};
use crate::errors::SyncError;
use crate::processor::ChangeProcessor;

pub use result::{BulkFailureReport, FailedOperation, HandlerResult, HandlerStatus};

/// Handler that keeps the search index in sync with the table stream.
///
/// Each call to [`Synchronizer::handle`] is independent: the index is checked
/// again every time and nothing is cached between batches. The synchronizer
/// never retries; any failure is returned so the stream runtime redelivers the
/// batch.
pub struct Synchronizer {
    provider: Arc<dyn SearchIndexProvider>,
    processor: ChangeProcessor,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl Synchronizer {
    /// Create a new synchronizer writing through `provider`.
    pub fn new(
        provider: Arc<dyn SearchIndexProvider>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            provider,
            processor: ChangeProcessor::new(),
            diagnostics,
        }
    }

    /// Apply a batch of change events, stamping time-less events with the current time.
    pub async fn handle(&self, batch: Vec<ChangeEvent>) -> Result<HandlerResult, SyncError> {
        self.handle_at(batch, Utc::now()).await
    }

    /// Apply a batch of change events.
    ///
    /// Events are translated in order; malformed events are reported and
    /// dropped. When nothing is left to apply the call returns without touching
    /// the index. Otherwise the index is created if missing and every
    /// operation is submitted in one bulk request.
    ///
    /// # Arguments
    ///
    /// * `batch` - Change events in stream order
    /// * `invoked_at` - Timestamp for documents whose event has no capture time
    ///
    /// # Returns
    ///
    /// * `Ok(HandlerResult)` - If every operation was applied, or there was nothing to apply
    /// * `Err(SyncError::BulkPartialFailure)` - If the index rejected any operation
    /// * `Err(SyncError::TransportFailure)` - If the index could not be checked, created or written
    #[instrument(skip(self, batch), fields(index = %self.provider.index_name(), event_count = batch.len()))]
    pub async fn handle_at(
        &self,
        batch: Vec<ChangeEvent>,
        invoked_at: DateTime<Utc>,
    ) -> Result<HandlerResult, SyncError> {
        self.diagnostics.report(DiagnosticEvent::BatchReceived {
            index: self.provider.index_name().to_string(),
            event_count: batch.len(),
        });

        let translation = self.processor.translate(batch, invoked_at);

        for dropped in translation.dropped {
            if let SyncError::MalformedEvent { event_id, reason } = dropped {
                self.diagnostics
                    .report(DiagnosticEvent::EventDropped { event_id, reason });
            }
        }
        for skipped in translation.skipped {
            self.diagnostics.report(DiagnosticEvent::EventSkipped {
                event_id: skipped.event_id,
                event_kind: skipped.event_kind,
            });
        }

        if translation.operations.is_empty() {
            self.diagnostics.report(DiagnosticEvent::NoOperations);
            return Ok(HandlerResult::no_operations());
        }

        self.ensure_index().await?;
        self.submit(&translation.operations).await
    }

    /// Make sure the target index exists, creating it if necessary.
    ///
    /// Existence check and creation are two separate calls, so concurrent
    /// invocations may both try to create the index. Losing that race is not
    /// an error.
    pub async fn ensure_index(&self) -> Result<(), SyncError> {
        if self.provider.index_exists().await? {
            debug!(index = %self.provider.index_name(), "Index exists");
            return Ok(());
        }

        let index = self.provider.index_name().to_string();
        match self.provider.create_index().await? {
            CreateIndexOutcome::Created => {
                self.diagnostics.report(DiagnosticEvent::IndexCreated { index });
            }
            CreateIndexOutcome::AlreadyExists => {
                self.diagnostics
                    .report(DiagnosticEvent::IndexCreationRaced { index });
            }
        }
        Ok(())
    }

    /// Submit the operations as one bulk request and interpret the outcome.
    async fn submit(&self, operations: &[BulkOperation]) -> Result<HandlerResult, SyncError> {
        let response = self.provider.bulk(operations).await?;

        if let Some(report) =
            BulkFailureReport::from_response(self.provider.index_name(), operations, &response)
        {
            self.diagnostics
                .report(DiagnosticEvent::BulkFailures(report.clone()));
            return Err(SyncError::BulkPartialFailure(report));
        }

        self.diagnostics.report(DiagnosticEvent::BulkSubmitted {
            operation_count: operations.len(),
            item_count: response.items.len(),
        });
        Ok(HandlerResult::success(response.items.len()))
    }
}
