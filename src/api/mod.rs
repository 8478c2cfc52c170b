//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api`; `/health` and
//! `/config/upload-limits` sit at the root.

pub mod dto;
pub mod extract;
pub mod handlers;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::app_state::AppState;

/// Room left for multipart boundaries and the non-file form fields on top of
/// the upload ceiling.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "sheet-vault", description = "Spreadsheet ingestion and archive service"),
    paths(
        handlers::system::health_handler,
        handlers::system::upload_limits_handler,
        handlers::entry::create_entry,
        handlers::entry::paste_entry,
        handlers::upload::upload_entry,
        handlers::entry::list_entries,
        handlers::entry::entry_stats,
        handlers::entry::get_entry,
        handlers::entry::delete_entry,
        handlers::entry::download_entry,
        handlers::backup::create_backup,
        handlers::backup::list_backups,
        handlers::backup::restore_backup,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Entries", description = "Ingest, browse and export spreadsheet entries"),
        (name = "Backups", description = "JSON snapshots of the entry store"),
        (name = "System", description = "Health and client configuration"),
    )
)]
pub struct ApiDoc;

#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

/// Builds the complete API router with all REST endpoints.
///
/// `max_upload_bytes` raises Axum's default request body cap so uploads up
/// to the configured ceiling reach the validator, which reports oversize
/// files with a structured error.
pub fn build_router(max_upload_bytes: u64) -> Router<AppState> {
    let body_limit = usize::try_from(max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    with_docs(
        Router::new()
            .nest("/api", handlers::routes())
            .merge(handlers::system::routes())
            .layer(DefaultBodyLimit::max(body_limit)),
    )
}

#[cfg(feature = "swagger-ui")]
fn with_docs(router: Router<AppState>) -> Router<AppState> {
    router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn with_docs(router: Router<AppState>) -> Router<AppState> {
    router
}
