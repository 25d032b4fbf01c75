//! Query responder interface and the types exchanged with it.

use crate::catalog::{CatalogEntry, Metadata};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The part of a catalog entry forwarded to the responder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub filename: String,
    pub metadata: Metadata,
}

impl From<&CatalogEntry> for Candidate {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id,
            filename: entry.filename.clone(),
            metadata: entry.metadata.clone(),
        }
    }
}

/// A ranked match for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub filename: String,
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prior turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Conversational answer: a free-text message plus ranked matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub results: Vec<Match>,
}

/// Ranks catalog entries against a natural-language query.
#[async_trait]
pub trait QueryResponder: Send + Sync {
    /// Rank `candidates` for `query`.
    async fn rank(&self, query: &str, candidates: &[Candidate]) -> Result<Vec<Match>>;

    /// Answer `query` conversationally, taking prior turns into account.
    async fn converse(
        &self,
        query: &str,
        history: &[ChatTurn],
        candidates: &[Candidate],
    ) -> Result<ChatReply>;
}

/// Shared handle to a responder.
pub type DynQueryResponder = Arc<dyn QueryResponder>;
