//! This module defines the core data structures used across the stream indexer.
//! It re-exports the change event, typed value and document types.

pub mod change_event;
pub mod index_document;
pub mod typed_value;

pub use change_event::{ChangeEvent, EventKind, StreamBatch, StreamPayload, StreamRecord};
pub use index_document::{document_id, IndexDocument, ID_FIELD, TIMESTAMP_FIELD};
pub use typed_value::{transcode_item, Item, TypedValue};
