//! OpenAI-compatible chat completions client.
//!
//! Implements both [`VisionAnalyzer`] and [`QueryResponder`] against
//! `POST {base_url}/chat/completions` with `response_format: json_object`.
//! Every call is bounded by [`ProviderSettings::timeout`].

use crate::analyzer::VisionAnalyzer;
use crate::catalog::Metadata;
use crate::config::{NetworkConfig, ProviderSettings, QueryConfig};
use crate::responder::{Candidate, ChatReply, ChatTurn, Match, QueryResponder, Role};
use crate::{Result, ShotSearchError};
use async_trait::async_trait;
use base64::Engine as _;
use serde_json::{json, Value};
use std::path::Path;
use tracing::{debug, warn};

const ANALYSIS_PROMPT: &str = r#"Analyze this screenshot and return a JSON object with these fields:
{
  "description": "Detailed description of what the image shows",
  "text_content": "All readable text in the image, transcribed verbatim",
  "visual_elements": ["key", "visual", "elements"],
  "colors": ["dominant", "colors"],
  "context": "Kind of screenshot (code, email, chart, document, ...)",
  "keywords": ["searchable", "keywords"],
  "summary": "One-line summary"
}

Transcribe text thoroughly; it is used for search."#;

const RANKING_PROMPT: &str = r#"You help users find screenshots. You receive a query and a list of indexed screenshots with their metadata.

Judge how well each screenshot matches the query, score it with a confidence between 0.0 and 1.0, and return at most the 5 best matches as JSON:
{
  "results": [
    {"id": 1, "filename": "example.png", "confidence": 0.95, "reason": "Short explanation of the match"}
  ]
}

Only include screenshots with confidence above 0.3. Return an empty "results" array when nothing matches."#;

const CONVERSATION_PROMPT: &str = r#"You are a friendly assistant that helps users find their screenshots. You receive the conversation so far, a new user message and a list of indexed screenshots with their metadata.

Reply conversationally and point to the screenshots that answer the request. Return JSON:
{
  "message": "Your reply to the user",
  "results": [
    {"id": 1, "filename": "example.png", "confidence": 0.95, "reason": "Short explanation of the match"}
  ]
}

Score matches between 0.0 and 1.0, include only those above 0.3 and at most 5. Use an empty "results" array when nothing matches."#;

fn upstream(message: impl Into<String>) -> ShotSearchError {
    ShotSearchError::Upstream {
        message: message.into(),
    }
}

/// Encode image bytes as a data URL, sniffing the MIME type from content.
pub fn image_data_url(bytes: &[u8]) -> String {
    let mime = image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("image/jpeg");
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, b64)
}

/// Pull the JSON object out of a chat completions response body.
pub fn extract_json_content(body: &Value) -> Result<Metadata> {
    let content = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| upstream("Response has no message content"))?;

    match serde_json::from_str::<Value>(content.trim()) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(upstream("Model reply is not a JSON object")),
        Err(e) => Err(upstream(format!("Model reply is not valid JSON: {}", e))),
    }
}

/// Parse the `results` array of a ranking reply. Malformed items are skipped.
pub fn parse_matches(reply: &Metadata) -> Vec<Match> {
    let Some(items) = reply.get("results").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<Match>(item.clone()) {
            Ok(m) => Some(m),
            Err(e) => {
                warn!("Skipping malformed match {}: {}", item, e);
                None
            }
        })
        .collect()
}

fn candidates_message(query: &str, candidates: &[Candidate]) -> Result<String> {
    let context = serde_json::to_string_pretty(candidates)?;
    Ok(format!(
        "User query: \"{}\"\n\nAvailable screenshots:\n{}\n\nFind the {} most relevant screenshots for this query.",
        query,
        context,
        QueryConfig::MAX_RESULTS
    ))
}

/// Chat completions client for OpenAI and compatible providers.
pub struct OpenAiClient {
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client from provider settings.
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(NetworkConfig::CONNECT_TIMEOUT)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| ShotSearchError::Config {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { settings, client })
    }

    /// Get the provider settings.
    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Send a chat completions request and return the JSON object the model replied with.
    async fn complete(&self, messages: Value, max_tokens: Option<u32>) -> Result<Metadata> {
        let url = self.settings.completions_url();

        let mut body = json!({
            "model": self.settings.model,
            "messages": messages,
            "response_format": {"type": "json_object"},
        });
        if let Some(max_tokens) = max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = self.settings.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        debug!("POST {} (model {})", url, self.settings.model);
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(upstream(format!("Provider returned {}: {}", status, text)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| upstream(format!("Failed to parse provider response: {}", e)))?;

        extract_json_content(&body)
    }

    fn map_send_error(&self, err: reqwest::Error) -> ShotSearchError {
        if err.is_timeout() {
            ShotSearchError::UpstreamTimeout(self.settings.timeout)
        } else {
            upstream(format!("Request to provider failed: {}", err))
        }
    }
}

#[async_trait]
impl VisionAnalyzer for OpenAiClient {
    async fn analyze(&self, path: &Path) -> Result<Metadata> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ShotSearchError::io_with_path(e, path))?;

        let messages = json!([
            {
                "role": "user",
                "content": [
                    {"type": "text", "text": ANALYSIS_PROMPT},
                    {"type": "image_url", "image_url": {"url": image_data_url(&bytes)}}
                ]
            }
        ]);

        self.complete(messages, Some(NetworkConfig::ANALYSIS_MAX_TOKENS))
            .await
    }
}

#[async_trait]
impl QueryResponder for OpenAiClient {
    async fn rank(&self, query: &str, candidates: &[Candidate]) -> Result<Vec<Match>> {
        let messages = json!([
            {"role": "system", "content": RANKING_PROMPT},
            {"role": "user", "content": candidates_message(query, candidates)?}
        ]);

        let reply = self.complete(messages, None).await?;
        Ok(parse_matches(&reply))
    }

    async fn converse(
        &self,
        query: &str,
        history: &[ChatTurn],
        candidates: &[Candidate],
    ) -> Result<ChatReply> {
        let mut messages = vec![json!({"role": "system", "content": CONVERSATION_PROMPT})];
        for turn in history {
            let role = match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            messages.push(json!({"role": role, "content": turn.content}));
        }
        messages.push(json!({"role": "user", "content": candidates_message(query, candidates)?}));

        let reply = self.complete(Value::Array(messages), None).await?;
        let message = reply
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(ChatReply {
            message,
            results: parse_matches(&reply),
        })
    }
}
