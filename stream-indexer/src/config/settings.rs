//! Synchronizer configuration.

use std::env;

use stream_indexer_repository::opensearch::DEFAULT_INDEX_NAME;
use stream_indexer_repository::{SigningConfig, SigningService};

use crate::errors::IndexingError;

/// Default signing region.
const DEFAULT_REGION: &str = "us-east-1";

/// Kind of OpenSearch deployment the index lives in.
///
/// Only affects how requests are signed, never what is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionMode {
    /// Managed OpenSearch domain.
    ManagedDomain,
    /// OpenSearch Serverless collection.
    Serverless,
}

impl CollectionMode {
    /// The signing service matching this deployment.
    pub fn signing_service(&self) -> SigningService {
        match self {
            Self::ManagedDomain => SigningService::ManagedDomain,
            Self::Serverless => SigningService::ServerlessCollection,
        }
    }
}

/// Everything the synchronizer needs to reach its index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Endpoint URL of the search engine.
    pub index_endpoint: String,
    /// Target index.
    pub index_name: String,
    /// Region used to sign requests.
    pub region: String,
    pub collection_mode: CollectionMode,
}

impl SyncConfig {
    /// Load the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `USE_SERVERLESS_COLLECTION`: `"true"` selects a serverless collection (default: managed domain)
    /// - `OPENSEARCH_COLLECTION_ENDPOINT`: Collection endpoint, required in serverless mode
    /// - `OPENSEARCH_DOMAIN_ENDPOINT`: Domain endpoint, required otherwise; `https://` is
    ///   prepended when no scheme is given
    /// - `OPENSEARCH_INDEX`: Index name (default: dynamodb-data)
    /// - `REGION`: Signing region (default: us-east-1)
    ///
    /// # Returns
    ///
    /// * `Ok(SyncConfig)` - The loaded configuration
    /// * `Err(IndexingError)` - If the endpoint for the selected mode is missing
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load the configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let collection_mode = match get("USE_SERVERLESS_COLLECTION") {
            Some(flag) if flag.trim().eq_ignore_ascii_case("true") => CollectionMode::Serverless,
            _ => CollectionMode::ManagedDomain,
        };

        let endpoint_var = match collection_mode {
            CollectionMode::Serverless => "OPENSEARCH_COLLECTION_ENDPOINT",
            CollectionMode::ManagedDomain => "OPENSEARCH_DOMAIN_ENDPOINT",
        };
        let index_endpoint = get(endpoint_var)
            .map(|endpoint| with_scheme(endpoint.trim()))
            .ok_or_else(|| IndexingError::config(format!("{} is not set", endpoint_var)))?;

        Ok(Self {
            index_endpoint,
            index_name: get("OPENSEARCH_INDEX").unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
            region: get("REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            collection_mode,
        })
    }

    /// Request signing settings for this configuration.
    pub fn signing(&self) -> SigningConfig {
        SigningConfig {
            region: self.region.clone(),
            service: self.collection_mode.signing_service(),
        }
    }
}

/// Prefix `https://` to endpoints given as a bare host name.
fn with_scheme(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    }
}
