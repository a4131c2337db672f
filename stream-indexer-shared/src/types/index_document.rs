//! Document types for the search index.
//!
//! This module defines the document written to the search index for every
//! INSERT or MODIFY change event.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::types::typed_value::{transcode_item, Item};

/// Field holding the document identifier, both in record images and in the index.
pub const ID_FIELD: &str = "id";

/// Field holding the capture time of the change in epoch milliseconds.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Document representation for the search index.
///
/// # Fields
///
/// - `id`: document identifier, taken from the record's `id` attribute
/// - `fields`: every transcoded attribute of the record image plus `timestamp`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocument {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl IndexDocument {
    /// Build a document from a record image.
    ///
    /// The image is transcoded and a `timestamp` field is set from
    /// `event_time_seconds`, falling back to `invoked_at` when the event carries
    /// no usable capture time. Returns `None` when the image has no usable `id`.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::Utc;
    /// use stream_indexer_shared::{IndexDocument, Item, TypedValue};
    ///
    /// let image = Item::from([("id".to_string(), TypedValue::String("1".to_string()))]);
    /// let doc = IndexDocument::from_image(&image, Some(2.0), Utc::now()).unwrap();
    ///
    /// assert_eq!(doc.id, "1");
    /// assert_eq!(doc.fields["timestamp"], 2000);
    /// ```
    pub fn from_image(
        image: &Item,
        event_time_seconds: Option<f64>,
        invoked_at: DateTime<Utc>,
    ) -> Option<Self> {
        let mut fields = transcode_item(image);
        let id = fields.get(ID_FIELD).and_then(document_id)?;

        fields.insert(
            TIMESTAMP_FIELD.to_string(),
            Value::from(timestamp_millis(event_time_seconds, invoked_at)),
        );

        Some(Self { id, fields })
    }

    /// The document body as sent to the index.
    pub fn body(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Render a transcoded id attribute as a document identifier.
///
/// Strings are used verbatim and numbers as their decimal text. Empty strings
/// and every other shape yield `None`.
pub fn document_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Milliseconds since the epoch for a change captured at `event_time_seconds`.
///
/// Missing, zero, negative or non-finite capture times fall back to `invoked_at`.
pub fn timestamp_millis(event_time_seconds: Option<f64>, invoked_at: DateTime<Utc>) -> i64 {
    match event_time_seconds {
        Some(seconds) if seconds.is_finite() && seconds > 0.0 => (seconds * 1000.0).round() as i64,
        _ => invoked_at.timestamp_millis(),
    }
}
