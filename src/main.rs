//! Verso server — versioned object storage.
//!
//! Main entry point that wires the metadata store, blob store, and event
//! sink together and hosts the file services until shutdown. The REST
//! surface lives in the platform gateway; this process owns the storage
//! semantics.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use verso_core::config::AppConfig;
use verso_core::error::AppError;
use verso_service::{
    AccessService, DeletionService, FileService, RestoreService, UploadService,
};

#[tokio::main]
async fn main() {
    let env = std::env::var("VERSO_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// All file services, wired against the configured backends.
struct Services {
    _upload: UploadService,
    _restore: RestoreService,
    _access: AccessService,
    _delete: DeletionService,
    _files: FileService,
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Verso v{}", env!("CARGO_PKG_VERSION"));

    // Database connection + migrations.
    let db = verso_database::DatabasePool::connect(&config.database).await?;
    verso_database::migration::run_migrations(db.pool()).await?;

    // Blob store and event sink, one implementation each.
    let blobs = verso_storage::connect(&config.storage).await?;
    tracing::info!(provider = blobs.provider_type(), "Blob store initialized");

    let events = verso_event::connect(&config.events)?;
    tracing::info!(sink = events.sink_type(), "Event sink initialized");

    // Repositories and services.
    let entries = Arc::new(verso_database::repositories::PgFileEntryRepository::new(
        db.pool().clone(),
    ));
    let versions = Arc::new(verso_database::repositories::PgFileVersionRepository::new(
        db.pool().clone(),
    ));

    let _services = Services {
        _upload: UploadService::new(
            entries.clone(),
            versions.clone(),
            blobs.clone(),
            events.clone(),
            config.storage.max_upload_size_bytes,
        ),
        _restore: RestoreService::new(entries.clone(), versions.clone()),
        _access: AccessService::new(entries.clone(), versions.clone(), blobs.clone()),
        _delete: DeletionService::new(entries.clone(), events.clone()),
        _files: FileService::new(entries, versions),
    };

    if !blobs.health_check().await.unwrap_or(false) {
        tracing::warn!("Blob store health check failed at startup");
    }

    tracing::info!("Verso ready");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::internal(format!("Failed to listen for shutdown signal: {e}")))?;

    tracing::info!("Shutting down");
    db.close().await;
    Ok(())
}
