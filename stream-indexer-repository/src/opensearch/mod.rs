//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend, optionally signing requests with SigV4.

mod index_config;
mod provider;

pub use index_config::{get_index_settings, IndexConfig, DEFAULT_INDEX_NAME};
pub use provider::{classify_create_response, OpenSearchProvider, SigningConfig, SigningService};
