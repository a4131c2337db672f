//! # Stream Indexer Shared
//!
//! This crate defines shared data structures used across the stream indexer.
//! It covers the change-stream records delivered by the table stream, the
//! typed attribute encoding they carry, and the documents written to the
//! search index.

pub mod types;

pub use types::change_event::{ChangeEvent, EventKind, StreamBatch, StreamPayload, StreamRecord};
pub use types::index_document::{document_id, IndexDocument, ID_FIELD, TIMESTAMP_FIELD};
pub use types::typed_value::{transcode_item, Item, TypedValue};
