//! Catalog maintenance and statistics.

use super::ApiError;
use crate::server::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shotsearch_core::ReconcileReport;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct ReindexResponse {
    pub message: &'static str,
    pub total_screenshots: usize,
    pub report: ReconcileReport,
}

#[derive(Debug, Serialize)]
pub struct ScreenshotSummary {
    pub filename: String,
    pub indexed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_screenshots: usize,
    pub screenshots: Vec<ScreenshotSummary>,
}

/// Run a reconciliation pass and report the catalog size afterwards.
pub async fn handle_reindex(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReindexResponse>, ApiError> {
    let report = state
        .api
        .reindex()
        .await
        .map_err(|e| ApiError::new("Re-indexing error", e))?;
    let total_screenshots = state
        .api
        .store()
        .count()
        .map_err(|e| ApiError::new("Re-indexing error", e))?;

    info!(
        "Re-index: {} indexed, {} removed, {} failed",
        report.indexed,
        report.removed,
        report.failed
    );

    Ok(Json(ReindexResponse {
        message: "Re-indexing complete",
        total_screenshots,
        report,
    }))
}

pub async fn handle_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let entries = state
        .api
        .list_screenshots()
        .map_err(|e| ApiError::new("Stats error", e))?;

    let screenshots: Vec<ScreenshotSummary> = entries
        .into_iter()
        .map(|entry| ScreenshotSummary {
            filename: entry.filename,
            indexed_at: entry.indexed_at,
        })
        .collect();

    Ok(Json(StatsResponse {
        total_screenshots: screenshots.len(),
        screenshots,
    }))
}
