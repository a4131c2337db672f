//! Processor module for the stream indexer.
//!
//! Translates change events into bulk index operations.

mod change_processor;

pub use change_processor::{ChangeProcessor, Translation};
