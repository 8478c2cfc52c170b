//! REST endpoint handlers organized by resource.

pub mod backup;
pub mod entry;
pub mod system;
pub mod upload;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(entry::routes())
        .merge(upload::routes())
        .merge(backup::routes())
}
