//! Diagnostics for the stream indexer.
//!
//! The synchronizer never logs directly. It reports [`DiagnosticEvent`]s to an
//! injected [`DiagnosticSink`]; production uses [`TracingDiagnostics`], tests
//! capture the events instead.

use stream_indexer_shared::EventKind;
use tracing::{debug, error, info, warn};

use crate::errors::DropReason;
use crate::synchronizer::BulkFailureReport;

/// Something an operator may want to know about a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// A batch arrived.
    BatchReceived { index: String, event_count: usize },
    /// The index was missing and this invocation created it.
    IndexCreated { index: String },
    /// The index was missing, but a concurrent invocation created it first.
    IndexCreationRaced { index: String },
    /// An event was dropped because it could not be translated.
    EventDropped {
        event_id: Option<String>,
        reason: DropReason,
    },
    /// An event of a kind that is not indexed was ignored.
    EventSkipped {
        event_id: Option<String>,
        event_kind: EventKind,
    },
    /// Nothing was left to submit after translation.
    NoOperations,
    /// The bulk request was accepted in full.
    BulkSubmitted {
        operation_count: usize,
        item_count: usize,
    },
    /// The bulk request completed with rejected operations.
    BulkFailures(BulkFailureReport),
}

/// Capability for reporting diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, event: DiagnosticEvent);
}

/// Sink that forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::BatchReceived { index, event_count } => {
                info!(index = %index, event_count = event_count, "Received stream batch");
            }
            DiagnosticEvent::IndexCreated { index } => {
                info!(index = %index, "Created index");
            }
            DiagnosticEvent::IndexCreationRaced { index } => {
                info!(index = %index, "Index was created concurrently");
            }
            DiagnosticEvent::EventDropped { event_id, reason } => {
                warn!(event_id = ?event_id, reason = %reason, "Dropped malformed event");
            }
            DiagnosticEvent::EventSkipped {
                event_id,
                event_kind,
            } => {
                debug!(event_id = ?event_id, event_kind = ?event_kind, "Skipped event");
            }
            DiagnosticEvent::NoOperations => {
                info!("No operations to perform");
            }
            DiagnosticEvent::BulkSubmitted {
                operation_count,
                item_count,
            } => {
                info!(
                    operations = operation_count,
                    items = item_count,
                    "Successfully processed {} items.",
                    item_count
                );
            }
            DiagnosticEvent::BulkFailures(report) => {
                let summary = report.summary();
                let details = serde_json::to_string_pretty(&report.failures).unwrap_or_default();
                error!(
                    total = report.total,
                    failed = report.failures.len(),
                    summary = %summary.message,
                    "Failed documents: {}",
                    details
                );
            }
        }
    }
}
