//! Stream Indexer Main Entry Point
//!
//! Lambda binary that receives DynamoDB stream batches and applies them to
//! an OpenSearch index. Failures are returned to the runtime so the batch is
//! redelivered.

use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use stream_indexer::{Dependencies, HandlerResult, IndexingError, SyncConfig, Synchronizer};
use stream_indexer_shared::StreamBatch;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), IndexingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("stream_indexer=info,stream_indexer_repository=info")
    });

    let in_lambda = env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok();

    if in_lambda {
        // Inside Lambda, use JSON format for structured logging
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .without_time(),
            )
            .try_init()
            .map_err(|e| IndexingError::config(e.to_string()))?;

        info!(
            service_name = "stream-indexer",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        // Outside Lambda, use pretty console output
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| IndexingError::config(e.to_string()))?;

        info!(
            service_name = "stream-indexer",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }

    Ok(())
}

/// Handle one Lambda invocation.
async fn handle_event(
    synchronizer: Arc<Synchronizer>,
    event: LambdaEvent<StreamBatch>,
) -> Result<HandlerResult, Error> {
    let (batch, context) = event.into_parts();

    debug!(
        request_id = %context.request_id,
        event = %serde_json::to_string(&batch).unwrap_or_default(),
        "Received event"
    );

    match synchronizer.handle(batch.into_events()).await {
        Ok(result) => Ok(result),
        Err(e) => {
            error!(request_id = %context.request_id, error = %e, "Error processing stream records");
            Err(IndexingError::from(e).into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    info!("Starting stream indexer");

    let config = SyncConfig::from_env()?;

    let deps = match Dependencies::new(&config).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e.into());
        }
    };

    let synchronizer = deps.synchronizer;
    run(service_fn(move |event: LambdaEvent<StreamBatch>| {
        handle_event(Arc::clone(&synchronizer), event)
    }))
    .await
}
