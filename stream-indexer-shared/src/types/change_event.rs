//! Change events delivered by the table stream.
//!
//! [`StreamBatch`] and [`StreamRecord`] mirror the JSON the delivery runtime
//! hands to the handler. [`ChangeEvent`] is the trimmed-down view the
//! synchronizer works with.

use serde::{Deserialize, Serialize};

use crate::types::typed_value::{Item, TypedValue};

/// Kind of mutation a change event describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    /// A new record was written.
    Insert,
    /// An existing record was replaced or updated.
    Modify,
    /// A record was deleted.
    Remove,
    /// Any event name the indexer does not act on.
    #[default]
    #[serde(other)]
    Unknown,
}

/// One batch of stream records as delivered to the handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamBatch {
    #[serde(rename = "Records", default)]
    pub records: Vec<StreamRecord>,
}

impl StreamBatch {
    /// Convert every record into a [`ChangeEvent`], preserving order.
    pub fn into_events(self) -> Vec<ChangeEvent> {
        self.records.into_iter().map(ChangeEvent::from).collect()
    }
}

/// A single stream record in its wire shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamRecord {
    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(rename = "eventName", default)]
    pub event_name: EventKind,
    #[serde(rename = "eventSource", default, skip_serializing_if = "Option::is_none")]
    pub event_source: Option<String>,
    #[serde(rename = "awsRegion", default, skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,
    #[serde(
        rename = "eventSourceARN",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub event_source_arn: Option<String>,
    #[serde(default)]
    pub dynamodb: StreamPayload,
}

/// The change payload of a stream record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamPayload {
    #[serde(default)]
    pub keys: Item,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_image: Option<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_image: Option<Item>,
    /// Epoch seconds at which the change was captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_creation_date_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_view_type: Option<String>,
}

/// One change-log entry, as consumed by the synchronizer.
///
/// REMOVE events carry only `key`. INSERT and MODIFY events carry a
/// `new_image` that is expected to hold an `id` attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// Stream event id, used only for diagnostics.
    pub event_id: Option<String>,
    pub event_kind: EventKind,
    pub key: Item,
    pub new_image: Option<Item>,
    pub approximate_event_time_seconds: Option<f64>,
}

impl ChangeEvent {
    /// Create an INSERT event carrying `new_image`.
    pub fn insert(new_image: Item) -> Self {
        Self::with_image(EventKind::Insert, new_image)
    }

    /// Create a MODIFY event carrying `new_image`.
    pub fn modify(new_image: Item) -> Self {
        Self::with_image(EventKind::Modify, new_image)
    }

    /// Create a REMOVE event for the record identified by `key`.
    pub fn remove(key: Item) -> Self {
        Self {
            event_id: None,
            event_kind: EventKind::Remove,
            key,
            new_image: None,
            approximate_event_time_seconds: None,
        }
    }

    /// Set the approximate capture time in epoch seconds.
    pub fn at(mut self, epoch_seconds: f64) -> Self {
        self.approximate_event_time_seconds = Some(epoch_seconds);
        self
    }

    /// Set the stream event id.
    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    fn with_image(event_kind: EventKind, new_image: Item) -> Self {
        let key = new_image
            .get("id")
            .map(|id| Item::from([("id".to_string(), id.clone())]))
            .unwrap_or_default();

        Self {
            event_id: None,
            event_kind,
            key,
            new_image: Some(new_image),
            approximate_event_time_seconds: None,
        }
    }

    /// Look up an attribute of the record key.
    pub fn key_attribute(&self, name: &str) -> Option<&TypedValue> {
        self.key.get(name)
    }
}

impl From<StreamRecord> for ChangeEvent {
    fn from(record: StreamRecord) -> Self {
        Self {
            event_id: record.event_id,
            event_kind: record.event_name,
            key: record.dynamodb.keys,
            new_image: record.dynamodb.new_image,
            approximate_event_time_seconds: record.dynamodb.approximate_creation_date_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_stream_batch() {
        let batch: StreamBatch = serde_json::from_value(json!({
            "Records": [
                {
                    "eventID": "1",
                    "eventName": "INSERT",
                    "eventSource": "aws:dynamodb",
                    "awsRegion": "us-east-1",
                    "dynamodb": {
                        "ApproximateCreationDateTime": 1700000000.0,
                        "Keys": {"id": {"S": "todo-1"}},
                        "NewImage": {"id": {"S": "todo-1"}, "content": {"S": "Buy milk"}},
                        "SequenceNumber": "111",
                        "SizeBytes": 26,
                        "StreamViewType": "NEW_IMAGE"
                    }
                },
                {
                    "eventID": "2",
                    "eventName": "REMOVE",
                    "dynamodb": {"Keys": {"id": {"S": "todo-2"}}}
                }
            ]
        }))
        .unwrap();

        let events = batch.into_events();
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].event_kind, EventKind::Insert);
        assert_eq!(events[0].event_id.as_deref(), Some("1"));
        assert_eq!(events[0].approximate_event_time_seconds, Some(1700000000.0));
        assert!(events[0].new_image.as_ref().unwrap().contains_key("content"));

        assert_eq!(events[1].event_kind, EventKind::Remove);
        assert!(events[1].new_image.is_none());
        assert_eq!(
            events[1].key_attribute("id"),
            Some(&TypedValue::String("todo-2".to_string()))
        );
    }

    #[test]
    fn test_unknown_event_name() {
        let record: StreamRecord = serde_json::from_value(json!({
            "eventName": "TRUNCATE",
            "dynamodb": {}
        }))
        .unwrap();

        assert_eq!(record.event_name, EventKind::Unknown);
        assert!(record.dynamodb.keys.is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let batch: StreamBatch = serde_json::from_value(json!({})).unwrap();
        assert!(batch.records.is_empty());

        let record: StreamRecord = serde_json::from_value(json!({"eventName": "MODIFY"})).unwrap();
        let event = ChangeEvent::from(record);
        assert_eq!(event.event_kind, EventKind::Modify);
        assert!(event.new_image.is_none());
        assert!(event.key.is_empty());
    }

    #[test]
    fn test_insert_constructor_copies_id_into_key() {
        let image = Item::from([
            ("id".to_string(), TypedValue::String("a".to_string())),
            ("n".to_string(), TypedValue::Number("1".to_string())),
        ]);

        let event = ChangeEvent::insert(image).at(12.5).with_event_id("evt");

        assert_eq!(event.event_kind, EventKind::Insert);
        assert_eq!(event.key.len(), 1);
        assert_eq!(event.approximate_event_time_seconds, Some(12.5));
        assert_eq!(event.event_id.as_deref(), Some("evt"));
    }
}
