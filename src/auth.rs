//! Admin access control.
//!
//! Read, delete, download, stats and backup endpoints require
//! `Authorization: Bearer <ADMIN_TOKEN>`. Ingestion endpoints are open. With
//! no token configured every admin request is refused.

use std::fmt;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::error::AppError;

/// Checks requests against the configured admin token.
#[derive(Clone, Default)]
pub struct AdminGate {
    token: Option<Arc<str>>,
}

impl fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminGate")
            .field("configured", &self.token.is_some())
            .finish()
    }
}

impl AdminGate {
    /// Creates a gate. `None` (or a blank token) refuses everyone.
    #[must_use]
    pub fn new(token: Option<&str>) -> Self {
        Self {
            token: token.map(str::trim).filter(|t| !t.is_empty()).map(Arc::from),
        }
    }

    /// Returns `true` when the request carries the admin bearer token.
    #[must_use]
    pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.token.as_deref() else {
            return false;
        };
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|presented| {
                constant_time_eq(presented.trim().as_bytes(), expected.as_bytes())
            })
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Extractor that admits only admin requests.
///
/// Add it as a handler argument; the handler body never runs for a
/// rejected request, which gets `401` instead.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.admin.is_authorized(&parts.headers) {
            Ok(Self)
        } else {
            tracing::debug!(path = %parts.uri.path(), "admin request refused");
            Err(AppError::Unauthorized)
        }
    }
}
