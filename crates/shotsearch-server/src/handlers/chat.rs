//! Query handlers.

use super::ApiError;
use crate::server::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use shotsearch_core::{ChatTurn, Match};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub query: String,
    pub results: Vec<Match>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationRequest {
    pub query: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub query: String,
    pub message: String,
    pub results: Vec<Match>,
}

/// Rank indexed screenshots for a single query.
pub async fn handle_chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let results = state
        .api
        .search(&request.query)
        .await
        .map_err(|e| ApiError::new("Search error", e))?;

    info!("Query {:?} matched {} screenshots", request.query.trim(), results.len());

    Ok(Json(ChatResponse {
        query: request.query,
        results,
    }))
}

/// Conversational variant: prior turns in, a message plus matches out.
pub async fn handle_conversation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConversationRequest>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let reply = state
        .api
        .chat(&request.query, &request.history)
        .await
        .map_err(|e| ApiError::new("Chat error", e))?;

    Ok(Json(ConversationResponse {
        query: request.query,
        message: reply.message,
        results: reply.results,
    }))
}
