//! # Stream Indexer
//!
//! Keeps an OpenSearch index in sync with a DynamoDB table stream. Each
//! invocation receives one ordered batch of change records and applies it to
//! the index as a single bulk request.
//!
//! ## Architecture
//!
//! 1. **Processor**: Translates change events into bulk operations
//! 2. **Synchronizer**: Ensures the index exists, submits the bulk request and
//!    interprets per-document outcomes
//! 3. **Diagnostics**: Injected sink for everything worth telling an operator
//!
//! Retries are left to the stream runtime: any failure fails the whole batch,
//! which is then redelivered. Every write is an upsert or delete by id, so
//! redelivery is safe.
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`processor`]: Translates change events into bulk operations
//! - [`synchronizer`]: The batch handler
//! - [`diagnostics`]: Diagnostic sink capability and its tracing implementation
//! - [`errors`]: Error types for the indexer

pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod processor;
pub mod synchronizer;

pub use config::{CollectionMode, Dependencies, SyncConfig};
pub use diagnostics::{DiagnosticEvent, DiagnosticSink, TracingDiagnostics};
pub use errors::{DropReason, IndexingError, SyncError};
pub use synchronizer::{BulkFailureReport, FailedOperation, HandlerResult, HandlerStatus, Synchronizer};
