//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::AdminGate;
use crate::backup::BackupManager;
use crate::service::EntryService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Entry service for ingestion and retrieval.
    pub entry_service: Arc<EntryService>,
    /// Snapshot writer and restorer.
    pub backups: Arc<BackupManager>,
    /// Admin token check used by [`crate::auth::AdminAccess`].
    pub admin: AdminGate,
}
