//! Query handling on top of the catalog and a [`QueryResponder`].

use crate::catalog::CatalogStore;
use crate::config::QueryConfig;
use crate::responder::{Candidate, ChatReply, ChatTurn, DynQueryResponder, Match};
use crate::{Result, ShotSearchError};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Reject blank queries; returns the trimmed text.
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ShotSearchError::InvalidQuery {
            message: "Query cannot be empty".to_string(),
        });
    }
    Ok(trimmed)
}

/// Shape responder output into the result contract.
///
/// Confidence is clamped to `[0, 1]`, matches at or below
/// [`QueryConfig::MIN_CONFIDENCE`] or pointing at ids outside `candidates`
/// are dropped, repeated ids keep only their best match, and the rest is
/// sorted best-first and capped at
/// [`QueryConfig::MAX_RESULTS`].
pub fn normalize_matches(matches: Vec<Match>, candidates: &[Candidate]) -> Vec<Match> {
    let known: HashSet<i64> = candidates.iter().map(|c| c.id).collect();

    let mut kept: Vec<Match> = matches
        .into_iter()
        .filter(|m| known.contains(&m.id))
        .map(|mut m| {
            m.confidence = m.confidence.clamp(0.0, 1.0);
            m
        })
        .filter(|m| m.confidence > QueryConfig::MIN_CONFIDENCE)
        .collect();

    kept.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    // Best match per screenshot only
    let mut seen = HashSet::new();
    kept.retain(|m| seen.insert(m.id));

    kept.truncate(QueryConfig::MAX_RESULTS);
    kept
}

/// Answers queries by forwarding the whole catalog to a responder.
pub struct SearchService {
    store: CatalogStore,
    responder: DynQueryResponder,
    timeout: Duration,
}

impl SearchService {
    pub fn new(store: CatalogStore, responder: DynQueryResponder, timeout: Duration) -> Self {
        Self {
            store,
            responder,
            timeout,
        }
    }

    fn candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self.store.list_all()?.iter().map(Candidate::from).collect())
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ShotSearchError::UpstreamTimeout(self.timeout)),
        }
    }

    /// Rank the catalog against `query`.
    ///
    /// An empty catalog short-circuits to no results without a remote call.
    pub async fn search(&self, query: &str) -> Result<Vec<Match>> {
        let query = validate_query(query)?;

        let candidates = self.candidates()?;
        if candidates.is_empty() {
            debug!("Catalog is empty, skipping responder for {:?}", query);
            return Ok(Vec::new());
        }

        let matches = self.bounded(self.responder.rank(query, &candidates)).await?;
        Ok(normalize_matches(matches, &candidates))
    }

    /// Conversational variant of [`search`](Self::search).
    pub async fn chat(&self, query: &str, history: &[ChatTurn]) -> Result<ChatReply> {
        let query = validate_query(query)?;

        let candidates = self.candidates()?;
        if candidates.is_empty() {
            return Ok(ChatReply {
                message: "No screenshots have been indexed yet.".to_string(),
                results: Vec::new(),
            });
        }

        let reply = self
            .bounded(self.responder.converse(query, history, &candidates))
            .await?;
        Ok(ChatReply {
            message: reply.message,
            results: normalize_matches(reply.results, &candidates),
        })
    }
}
