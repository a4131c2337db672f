//! Results and failure reports of a synchronized batch.

use serde::Serialize;
use serde_json::{json, Value};
use stream_indexer_repository::{BulkOperation, BulkResponse};

/// Error type recorded for operations the bulk response has no item for.
const MISSING_ITEM_ERROR: &str = "missing_response_item";

/// Overall outcome of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HandlerStatus {
    /// Every operation was applied.
    Success,
    /// The batch translated to nothing; no request was made.
    NoOperations,
    /// Some operations were rejected by the index.
    PartialFailure,
}

/// Value returned to the stream runtime for a handled batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResult {
    pub status: HandlerStatus,
    pub processed_count: usize,
    pub message: String,
}

impl HandlerResult {
    /// All `processed_count` operations were applied.
    pub fn success(processed_count: usize) -> Self {
        Self {
            status: HandlerStatus::Success,
            processed_count,
            message: format!("Successfully processed {} items.", processed_count),
        }
    }

    /// Nothing to apply.
    pub fn no_operations() -> Self {
        Self {
            status: HandlerStatus::NoOperations,
            processed_count: 0,
            message: "No operations to perform".to_string(),
        }
    }
}

/// A bulk operation the index rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedOperation {
    /// Position of the operation within the bulk request.
    pub position: usize,
    pub status: u16,
    pub error: Value,
    /// The action-metadata line that was submitted.
    pub operation: Value,
    /// The document that was submitted, for upserts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Value>,
}

/// Every rejected operation of one bulk request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkFailureReport {
    pub index: String,
    /// Number of operations submitted.
    pub total: usize,
    pub failures: Vec<FailedOperation>,
}

impl BulkFailureReport {
    /// Collect the rejected operations of a bulk response.
    ///
    /// Response item `i` belongs to operation `i`; each operation produces
    /// exactly one item whether it is an upsert or a delete. Operations the
    /// response has no item for are unconfirmed and reported as failed.
    /// Returns `None` when every operation was confirmed.
    pub fn from_response(
        index: &str,
        operations: &[BulkOperation],
        response: &BulkResponse,
    ) -> Option<Self> {
        if !response.has_failures() && response.items.len() == operations.len() {
            return None;
        }

        let rejected = response
            .failed_items()
            .map(|(position, item)| {
                let operation = operations.get(position);
                FailedOperation {
                    position,
                    status: item.status,
                    error: item.error.clone().unwrap_or(Value::Null),
                    operation: operation
                        .map(|op| op.action_line(index))
                        .unwrap_or(Value::Null),
                    document: operation
                        .and_then(|op| op.document())
                        .map(|doc| doc.body()),
                }
            });

        let unconfirmed = operations
            .iter()
            .enumerate()
            .skip(response.items.len())
            .map(|(position, op)| FailedOperation {
                position,
                status: 0,
                error: json!({
                    "type": MISSING_ITEM_ERROR,
                    "reason": format!(
                        "bulk response has {} items for {} operations",
                        response.items.len(),
                        operations.len()
                    ),
                }),
                operation: op.action_line(index),
                document: op.document().map(|doc| doc.body()),
            });

        Some(Self {
            index: index.to_string(),
            total: operations.len(),
            failures: rejected.chain(unconfirmed).collect(),
        })
    }

    /// Number of operations that were applied.
    pub fn succeeded(&self) -> usize {
        self.total.saturating_sub(self.failures.len())
    }

    /// The batch result describing this report.
    pub fn summary(&self) -> HandlerResult {
        HandlerResult {
            status: HandlerStatus::PartialFailure,
            processed_count: self.succeeded(),
            message: format!(
                "Failed to index all documents: {} of {} operations failed",
                self.failures.len(),
                self.total
            ),
        }
    }
}
