//! Request and response types for bulk index operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use stream_indexer_shared::IndexDocument;

use crate::errors::SearchIndexError;

/// One mutation of the search index, in submission order.
///
/// `Index` is an upsert by document id and `Delete` removes by id. Both are
/// idempotent, so redelivering a batch converges to the same index state.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOperation {
    /// Insert or replace the document under its id.
    Index(IndexDocument),
    /// Delete the document with this id.
    Delete { id: String },
}

impl BulkOperation {
    /// Create an upsert operation.
    pub fn index(document: IndexDocument) -> Self {
        Self::Index(document)
    }

    /// Create a delete operation.
    pub fn delete(id: impl Into<String>) -> Self {
        Self::Delete { id: id.into() }
    }

    /// The bulk action this operation is submitted as.
    pub fn action(&self) -> BulkAction {
        match self {
            Self::Index(_) => BulkAction::Index,
            Self::Delete { .. } => BulkAction::Delete,
        }
    }

    /// The target document id.
    pub fn id(&self) -> &str {
        match self {
            Self::Index(document) => &document.id,
            Self::Delete { id } => id,
        }
    }

    /// The document body, for upserts.
    pub fn document(&self) -> Option<&IndexDocument> {
        match self {
            Self::Index(document) => Some(document),
            Self::Delete { .. } => None,
        }
    }

    /// The action-metadata line for this operation.
    pub fn action_line(&self, index: &str) -> Value {
        let meta = json!({ "_index": index, "_id": self.id() });
        match self {
            Self::Index(_) => json!({ "index": meta }),
            Self::Delete { .. } => json!({ "delete": meta }),
        }
    }

    /// The bulk lines for this operation: the action line, then the body for upserts.
    pub fn to_lines(&self, index: &str) -> Vec<Value> {
        let mut lines = vec![self.action_line(index)];
        if let Some(document) = self.document() {
            lines.push(document.body());
        }
        lines
    }
}

/// Build the full bulk request body for `operations`, one JSON value per line.
pub fn bulk_body(index: &str, operations: &[BulkOperation]) -> Vec<Value> {
    operations
        .iter()
        .flat_map(|operation| operation.to_lines(index))
        .collect()
}

/// Bulk action names as they appear in requests and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Index,
    Create,
    Update,
    Delete,
    #[serde(other)]
    Unknown,
}

/// Outcome of a single operation within a bulk request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkItemResult {
    pub action: BulkAction,
    pub id: Option<String>,
    /// HTTP status reported for this item.
    pub status: u16,
    /// Error object reported by the engine, if the item was rejected.
    pub error: Option<Value>,
}

impl BulkItemResult {
    /// Whether the engine accepted this item.
    ///
    /// Only an explicit error counts as a failure; deleting a missing document
    /// reports 404 without an error and is treated as success.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Parsed bulk response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkResponse {
    pub took: Option<u64>,
    /// Engine-level flag set when any item failed.
    pub errors: bool,
    /// One item per submitted operation, in submission order.
    pub items: Vec<BulkItemResult>,
}

#[derive(Deserialize)]
struct RawBulkResponse {
    #[serde(default)]
    took: Option<u64>,
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<BTreeMap<BulkAction, RawBulkItem>>,
}

#[derive(Deserialize)]
struct RawBulkItem {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(default)]
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

impl BulkResponse {
    /// Parse a bulk response body.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkResponse)` - The parsed response
    /// * `Err(SearchIndexError::ParseError)` - If the body is not a bulk response
    pub fn from_json(body: Value) -> Result<Self, SearchIndexError> {
        let raw: RawBulkResponse = serde_json::from_value(body)
            .map_err(|e| SearchIndexError::parse(format!("Invalid bulk response: {}", e)))?;

        let items = raw
            .items
            .into_iter()
            .enumerate()
            .map(|(position, item)| {
                item.into_iter()
                    .next()
                    .map(|(action, raw)| BulkItemResult {
                        action,
                        id: raw.id,
                        status: raw.status,
                        error: raw.error,
                    })
                    .ok_or_else(|| {
                        SearchIndexError::parse(format!("Empty bulk response item at {}", position))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            took: raw.took,
            errors: raw.errors,
            items,
        })
    }

    /// Whether any item in the response failed.
    pub fn has_failures(&self) -> bool {
        self.errors || self.items.iter().any(|item| !item.is_success())
    }

    /// Positions and results of every failed item.
    pub fn failed_items(&self) -> impl Iterator<Item = (usize, &BulkItemResult)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_success())
    }
}

/// Result of an index creation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateIndexOutcome {
    /// This call created the index.
    Created,
    /// Another caller created the index first.
    AlreadyExists,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn document(id: &str) -> IndexDocument {
        let mut fields = Map::new();
        fields.insert("id".to_string(), json!(id));
        fields.insert("timestamp".to_string(), json!(1000));
        IndexDocument {
            id: id.to_string(),
            fields,
        }
    }

    #[test]
    fn test_bulk_body_alternates_action_and_document() {
        let operations = vec![
            BulkOperation::index(document("a")),
            BulkOperation::delete("b"),
            BulkOperation::index(document("c")),
        ];

        let body = bulk_body("todos", &operations);

        assert_eq!(
            body,
            vec![
                json!({"index": {"_index": "todos", "_id": "a"}}),
                json!({"id": "a", "timestamp": 1000}),
                json!({"delete": {"_index": "todos", "_id": "b"}}),
                json!({"index": {"_index": "todos", "_id": "c"}}),
                json!({"id": "c", "timestamp": 1000}),
            ]
        );
    }

    #[test]
    fn test_operation_accessors() {
        let upsert = BulkOperation::index(document("a"));
        assert_eq!(upsert.action(), BulkAction::Index);
        assert_eq!(upsert.id(), "a");
        assert!(upsert.document().is_some());

        let delete = BulkOperation::delete("z");
        assert_eq!(delete.action(), BulkAction::Delete);
        assert_eq!(delete.id(), "z");
        assert!(delete.document().is_none());
    }

    #[test]
    fn test_parse_successful_response() {
        let response = BulkResponse::from_json(json!({
            "took": 7,
            "errors": false,
            "items": [
                {"index": {"_index": "todos", "_id": "a", "status": 201, "result": "created"}},
                {"delete": {"_index": "todos", "_id": "b", "status": 404, "result": "not_found"}}
            ]
        }))
        .unwrap();

        assert_eq!(response.took, Some(7));
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[1].action, BulkAction::Delete);
        assert_eq!(response.items[1].status, 404);
        assert!(!response.has_failures());
        assert_eq!(response.failed_items().count(), 0);
    }

    #[test]
    fn test_parse_partial_failure() {
        let response = BulkResponse::from_json(json!({
            "took": 3,
            "errors": true,
            "items": [
                {"index": {"_id": "a", "status": 201}},
                {"index": {"_id": "b", "status": 400, "error": {
                    "type": "mapper_parsing_exception",
                    "reason": "failed to parse field [timestamp]"
                }}},
                {"delete": {"_id": "c", "status": 200}}
            ]
        }))
        .unwrap();

        assert!(response.has_failures());
        let failed: Vec<_> = response.failed_items().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, 1);
        assert_eq!(failed[0].1.status, 400);
        assert_eq!(
            failed[0].1.error.as_ref().unwrap()["type"],
            "mapper_parsing_exception"
        );
    }

    #[test]
    fn test_parse_rejects_malformed_response() {
        let result = BulkResponse::from_json(json!({"items": "nope"}));
        assert!(matches!(result, Err(SearchIndexError::ParseError(_))));

        let result = BulkResponse::from_json(json!({"items": [{}]}));
        assert!(matches!(result, Err(SearchIndexError::ParseError(_))));
    }
}
