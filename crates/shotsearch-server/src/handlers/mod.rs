//! HTTP request handlers, split by domain.

pub mod chat;
pub mod images;
pub mod library;

#[cfg(test)]
pub(crate) mod testing;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use shotsearch_core::ShotSearchError;
use tracing::{error, warn};

// ============================================================================
// Error mapping
// ============================================================================

/// A library error on its way out as `{detail}`.
///
/// Server-side failures are prefixed with `context` so the caller can tell
/// which operation broke; client errors carry the bare message.
#[derive(Debug)]
pub struct ApiError {
    context: &'static str,
    error: ShotSearchError,
}

impl ApiError {
    pub fn new(context: &'static str, error: ShotSearchError) -> Self {
        Self { context, error }
    }

    fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            error!("{}: {}", self.context, self.error);
            format!("{}: {}", self.context, self.error)
        } else {
            warn!("{}: {}", self.context, self.error);
            self.error.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

// ============================================================================
// Service endpoints
// ============================================================================

/// Service descriptor.
pub async fn handle_root() -> Json<Value> {
    Json(json!({
        "message": "Screenshot Search API",
        "endpoints": {
            "chat": "/api/chat",
            "conversation": "/api/chat/conversation",
            "images": "/api/images/{filename}",
            "reindex": "/api/reindex",
            "stats": "/api/stats",
        }
    }))
}

/// Health check.
pub async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
