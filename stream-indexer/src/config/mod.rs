//! Configuration and dependency initialization for the stream indexer.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{CollectionMode, SyncConfig};
