//! Change processor implementation.
//!
//! Translates change events into bulk operations for the search index.

use chrono::{DateTime, Utc};
use stream_indexer_repository::BulkOperation;
use stream_indexer_shared::{document_id, ChangeEvent, EventKind, IndexDocument, ID_FIELD};
use tracing::{debug, instrument};

use crate::errors::{DropReason, SyncError};

/// Result of translating one batch.
#[derive(Debug, Default)]
pub struct Translation {
    /// Operations in the order of the events they came from.
    pub operations: Vec<BulkOperation>,
    /// Events that could not be translated. Every entry is a `SyncError::MalformedEvent`.
    pub dropped: Vec<SyncError>,
    /// Events of a kind the indexer does not act on.
    pub skipped: Vec<ChangeEvent>,
}

/// Processor that turns change events into index operations.
///
/// - REMOVE becomes a delete keyed by `key.id`
/// - INSERT and MODIFY become an upsert of the transcoded new image, keyed by its `id`
/// - anything else is skipped
#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeProcessor;

impl ChangeProcessor {
    /// Create a new change processor.
    pub fn new() -> Self {
        Self
    }

    /// Translate a batch of change events.
    ///
    /// Malformed events are collected in [`Translation::dropped`] instead of
    /// failing the batch.
    ///
    /// # Arguments
    ///
    /// * `events` - The events to translate, in stream order
    /// * `invoked_at` - Timestamp used for documents whose event has no capture time
    #[instrument(skip(self, events), fields(event_count = events.len()))]
    pub fn translate(&self, events: Vec<ChangeEvent>, invoked_at: DateTime<Utc>) -> Translation {
        let mut translation = Translation {
            operations: Vec::with_capacity(events.len()),
            ..Default::default()
        };

        for event in events {
            match self.translate_event(&event, invoked_at) {
                Ok(Some(operation)) => translation.operations.push(operation),
                Ok(None) => translation.skipped.push(event),
                Err(e) => translation.dropped.push(e),
            }
        }

        debug!(
            operations = translation.operations.len(),
            dropped = translation.dropped.len(),
            skipped = translation.skipped.len(),
            "Translated event batch"
        );
        translation
    }

    /// Translate a single change event.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(BulkOperation))` - The operation for this event
    /// * `Ok(None)` - If the event kind is not indexed
    /// * `Err(SyncError::MalformedEvent)` - If the event lacks its identifier or image
    pub fn translate_event(
        &self,
        event: &ChangeEvent,
        invoked_at: DateTime<Utc>,
    ) -> Result<Option<BulkOperation>, SyncError> {
        match event.event_kind {
            EventKind::Remove => {
                let id = event
                    .key_attribute(ID_FIELD)
                    .map(|value| value.transcode())
                    .as_ref()
                    .and_then(document_id)
                    .ok_or_else(|| {
                        SyncError::malformed(event.event_id.clone(), DropReason::MissingKeyId)
                    })?;

                Ok(Some(BulkOperation::delete(id)))
            }
            EventKind::Insert | EventKind::Modify => {
                let image = event.new_image.as_ref().ok_or_else(|| {
                    SyncError::malformed(event.event_id.clone(), DropReason::MissingNewImage)
                })?;

                let document = IndexDocument::from_image(
                    image,
                    event.approximate_event_time_seconds,
                    invoked_at,
                )
                .ok_or_else(|| {
                    SyncError::malformed(event.event_id.clone(), DropReason::MissingImageId)
                })?;

                Ok(Some(BulkOperation::index(document)))
            }
            EventKind::Unknown => Ok(None),
        }
    }
}
