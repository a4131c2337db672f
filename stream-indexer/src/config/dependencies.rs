//! Dependency initialization and wiring for the stream indexer.

use std::sync::Arc;

use stream_indexer_repository::opensearch::IndexConfig;
use stream_indexer_repository::{OpenSearchProvider, SearchIndexProvider};
use tracing::info;

use crate::config::SyncConfig;
use crate::diagnostics::{DiagnosticSink, TracingDiagnostics};
use crate::synchronizer::Synchronizer;
use crate::IndexingError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured synchronizer, shareable across invocations.
    pub synchronizer: Arc<Synchronizer>,
}

impl Dependencies {
    /// Build the OpenSearch provider and synchronizer for `config`.
    ///
    /// No request is sent to the index here; the first batch checks and, if
    /// needed, creates the index.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the provider could not be set up
    pub async fn new(config: &SyncConfig) -> Result<Self, IndexingError> {
        info!(
            index_endpoint = %config.index_endpoint,
            index_name = %config.index_name,
            region = %config.region,
            collection_mode = ?config.collection_mode,
            "Initializing dependencies"
        );

        let provider = OpenSearchProvider::new(
            &config.index_endpoint,
            IndexConfig::new(config.index_name.clone()),
            Some(config.signing()),
        )
        .await
        .map_err(|e| {
            IndexingError::config(format!("Failed to create OpenSearch provider: {}", e))
        })?;

        info!("OpenSearch provider created");

        Ok(Self::with_provider(
            Arc::new(provider),
            Arc::new(TracingDiagnostics),
        ))
    }

    /// Wire a synchronizer around an existing provider and diagnostic sink.
    pub fn with_provider(
        provider: Arc<dyn SearchIndexProvider>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            synchronizer: Arc::new(Synchronizer::new(provider, diagnostics)),
        }
    }
}
