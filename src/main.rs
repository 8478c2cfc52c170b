//! sheet-vault server entry point.
//!
//! Starts the Axum HTTP server and the backup scheduler, and shuts both down
//! on Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use sheet_vault::api;
use sheet_vault::app_state::AppState;
use sheet_vault::auth::AdminGate;
use sheet_vault::backup::{BackupManager, BackupScheduler};
use sheet_vault::config::AppConfig;
use sheet_vault::persistence::{EntryStore, PostgresEntryStore};
use sheet_vault::service::EntryService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config =
        AppConfig::from_env().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(addr = %config.listen_addr, "starting sheet-vault");

    // Build persistence layer
    let store = if config.persistence_enabled {
        let postgres = PostgresEntryStore::connect(&config)
            .await
            .context("failed to initialise the postgres entry store")?;
        Arc::new(EntryStore::Postgres(postgres))
    } else {
        tracing::warn!("persistence disabled; entries are kept in memory only");
        Arc::new(EntryStore::in_memory())
    };

    // Build service layer
    let entry_service = Arc::new(EntryService::new(
        Arc::clone(&store),
        config.upload_limits(),
    ));
    let backups = Arc::new(BackupManager::new(
        Arc::clone(&store),
        config.backup_dir.clone(),
    ));
    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set; admin endpoints will refuse every request");
    }

    // Start backup schedule
    let scheduler = config
        .backup_enabled
        .then(|| BackupScheduler::start(Arc::clone(&backups), config.backup_interval()));

    // Build application state
    let app_state = AppState {
        entry_service,
        backups,
        admin: AdminGate::new(config.admin_token.as_deref()),
    };

    // Build router
    let app = api::build_router(config.max_upload_bytes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(scheduler) = scheduler {
        scheduler.stop().await;
    }
    tracing::info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
