//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use opensearch::{
    auth::Credentials,
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    params::Refresh,
    BulkParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::{get_index_settings, IndexConfig};
use crate::types::{bulk_body, BulkOperation, BulkResponse, CreateIndexOutcome};

/// Error type the engine reports when creating an index that already exists.
const ALREADY_EXISTS_ERROR: &str = "resource_already_exists_exception";

/// AWS service a signed request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningService {
    /// Managed OpenSearch domain (`es`).
    ManagedDomain,
    /// OpenSearch Serverless collection (`aoss`).
    ServerlessCollection,
}

impl SigningService {
    /// The SigV4 service name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManagedDomain => "es",
            Self::ServerlessCollection => "aoss",
        }
    }
}

/// SigV4 request signing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningConfig {
    pub region: String,
    pub service: SigningService,
}

/// OpenSearch provider implementation.
///
/// Writes change-stream documents to a single index using the bulk API.
///
/// # Example
///
/// ```ignore
/// use stream_indexer_repository::opensearch::{IndexConfig, SigningConfig, SigningService};
/// let signing = SigningConfig {
///     region: "us-east-1".to_string(),
///     service: SigningService::ManagedDomain,
/// };
/// let provider = OpenSearchProvider::new(
///     "https://search-todos.us-east-1.es.amazonaws.com",
///     IndexConfig::new("dynamodb-data"),
///     Some(signing),
/// )
/// .await?;
///
/// if !provider.index_exists().await? {
///     provider.create_index().await?;
/// }
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// When `signing` is set, credentials are resolved from the default AWS
    /// provider chain and every request is signed with SigV4 for the given
    /// region and service.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch endpoint (e.g., "https://search-domain.us-east-1.es.amazonaws.com")
    /// * `index_config` - The index configuration
    /// * `signing` - Optional SigV4 signing settings
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(
        url: &str,
        index_config: IndexConfig,
        signing: Option<SigningConfig>,
    ) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();

        if let Some(ref signing) = signing {
            let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(signing.region.clone()))
                .load()
                .await;
            let credentials = Credentials::try_from(sdk_config)
                .map_err(|e| SearchIndexError::config(e.to_string()))?;

            builder = builder
                .auth(credentials)
                .service_name(signing.service.as_str());
        }

        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            index = %index_config.name,
            signing_service = signing.as_ref().map(|s| s.service.as_str()),
            region = signing.as_ref().map(|s| s.region.as_str()),
            "Created OpenSearch provider"
        );

        Ok(Self {
            client,
            index_config,
        })
    }
}

/// Interpret the response to an index creation request.
///
/// A 2xx status means this call created the index. A rejection whose error
/// type is `resource_already_exists_exception` means a concurrent caller won
/// the race, which is equally acceptable.
pub fn classify_create_response(
    status: u16,
    body: &Value,
) -> Result<CreateIndexOutcome, SearchIndexError> {
    if (200..300).contains(&status) {
        return Ok(CreateIndexOutcome::Created);
    }

    if body["error"]["type"].as_str() == Some(ALREADY_EXISTS_ERROR) {
        return Ok(CreateIndexOutcome::AlreadyExists);
    }

    Err(SearchIndexError::index_creation(format!(
        "Index creation failed with status {}: {}",
        status, body
    )))
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    fn index_name(&self) -> &str {
        &self.index_config.name
    }

    async fn index_exists(&self) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[self.index_config.name.as_str()]))
            .send()
            .await
            .map_err(|e| SearchIndexError::index_exists(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => {
                let error_body = response.text().await.unwrap_or_default();
                error!(status = status, body = %error_body, "Index existence check failed");
                Err(SearchIndexError::index_exists(format!(
                    "Index existence check failed with status {}: {}",
                    status, error_body
                )))
            }
        }
    }

    async fn create_index(&self) -> Result<CreateIndexOutcome, SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.index_config.name))
            .body(get_index_settings())
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        let status = response.status_code().as_u16();
        let body = if (200..300).contains(&status) {
            Value::Null
        } else {
            response.json::<Value>().await.unwrap_or_default()
        };

        let outcome = classify_create_response(status, &body);
        if let Err(ref e) = outcome {
            error!(index = %self.index_config.name, error = %e, "Create index request failed");
        }
        outcome
    }

    async fn bulk(&self, operations: &[BulkOperation]) -> Result<BulkResponse, SearchIndexError> {
        let body: Vec<JsonBody<Value>> = bulk_body(&self.index_config.name, operations)
            .into_iter()
            .map(JsonBody::new)
            .collect();

        let response = self
            .client
            .bulk(BulkParts::Index(&self.index_config.name))
            .refresh(Refresh::True)
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::bulk_index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_index(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let json = response
            .json::<Value>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;
        let parsed = BulkResponse::from_json(json)?;

        debug!(
            operations = operations.len(),
            items = parsed.items.len(),
            errors = parsed.errors,
            "Bulk request completed"
        );
        Ok(parsed)
    }
}
