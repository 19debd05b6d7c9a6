use actix_web::{
    HttpResponse, Responder, ResponseError,
    http::{StatusCode, header::ContentType},
    post,
    web::Data,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::error;

use sodasync::credentials::CredentialProvider;
use sodasync::destination::memory::MemoryDestination;
use sodasync::destination::postgres::PostgresDestination;
use sodasync::error::{ErrorKind, SyncError};
use sodasync::pipeline::SyncPipeline;
use sodasync::source::socrata::SocrataSource;
use sodasync::state::store::{MemoryCursorStore, PostgresCursorStore};
use sodasync::types::RunSummary;
use sodasync_config::shared::DestinationConfig;

use crate::config::ServerConfig;
use crate::routes::ErrorMessage;

/// Serializes sync runs: the source walk and the cursor commit are not safe to
/// interleave, so at most one run is in flight per process.
pub struct RunLock(pub Mutex<()>);

impl RunLock {
    pub fn new() -> Self {
        Self(Mutex::new(()))
    }
}

impl Default for RunLock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum SyncRunError {
    #[error("a sync run is already in progress")]
    AlreadyRunning,

    #[error(transparent)]
    Run(#[from] SyncError),
}

impl ResponseError for SyncRunError {
    fn status_code(&self) -> StatusCode {
        match self {
            SyncRunError::AlreadyRunning => StatusCode::CONFLICT,
            SyncRunError::Run(err) => match err.kind() {
                // Failures at the upstream API surface as a gateway problem.
                ErrorKind::SourceRequestFailed
                | ErrorKind::SourceRejectedRequest
                | ErrorKind::SourceResponseInvalid
                | ErrorKind::CredentialUnauthorized => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = ErrorMessage {
            error: self.to_string(),
        };
        let body =
            serde_json::to_string(&error_message).expect("failed to serialize error message");
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(body)
    }
}

/// Triggers one incremental sync run and returns its summary.
///
/// Returns 409 when a run is already in flight.
#[post("/sync-runs")]
pub async fn create_sync_run(
    config: Data<ServerConfig>,
    run_lock: Data<RunLock>,
) -> Result<impl Responder, SyncRunError> {
    let Ok(_guard) = run_lock.0.try_lock() else {
        return Err(SyncRunError::AlreadyRunning);
    };

    let summary = run_once(&config).await.inspect_err(|err| {
        error!(error = %err, "sync run failed");
    })?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Builds a pipeline for the configured destination and runs it once.
///
/// Dispatch is static per destination variant, each arm monomorphizes its own
/// pipeline.
async fn run_once(config: &ServerConfig) -> Result<RunSummary, SyncError> {
    let credentials = CredentialProvider::resolve(&config.source)?;
    let source = SocrataSource::new(&config.source, credentials)?;

    match &config.destination {
        DestinationConfig::Memory => {
            // An ephemeral destination: every run starts from scratch. Only
            // useful for smoke-testing source connectivity.
            let mut pipeline = SyncPipeline::new(
                config.pipeline.clone(),
                config.source.page_size,
                source,
                MemoryCursorStore::new(),
                MemoryDestination::new(),
            );

            pipeline.run().await
        }
        DestinationConfig::Postgres { connection, table } => {
            let destination = PostgresDestination::connect(connection, table.clone()).await?;
            let store = PostgresCursorStore::with_pool(destination.pool().clone()).await?;

            let mut pipeline = SyncPipeline::new(
                config.pipeline.clone(),
                config.source.page_size,
                source,
                store,
                destination,
            );

            pipeline.run().await
        }
    }
}
