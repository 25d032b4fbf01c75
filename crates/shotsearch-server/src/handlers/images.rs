//! Raw image serving.

use super::ApiError;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

pub async fn handle_image(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (bytes, content_type) = state
        .api
        .read_image(&filename)
        .await
        .map_err(|e| ApiError::new("Image error", e))?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}
