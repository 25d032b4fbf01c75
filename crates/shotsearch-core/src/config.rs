//! Centralized configuration for screenshot search.
//!
//! Constants for indexing, the remote model provider and query handling,
//! plus the runtime settings handed to the provider client.

use std::time::Duration;

/// Indexing configuration.
pub struct IndexConfig;

impl IndexConfig {
    /// Lowercase extensions (without the dot) that are eligible for indexing.
    pub const SUPPORTED_EXTENSIONS: [&'static str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];
    pub const DEFAULT_SCREENSHOTS_DIR: &'static str = "../screenshots";
    pub const DEFAULT_DATABASE_FILE: &'static str = "screenshots.db";
    /// Concurrent analyzer calls within one reconciliation pass.
    pub const DEFAULT_CONCURRENCY: usize = 4;
    pub const UNKNOWN_FORMAT: &'static str = "unknown";
}

/// Remote model provider configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &'static str = "gpt-4o";
    pub const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(120);
    pub const QUERY_TIMEOUT: Duration = Duration::from_secs(120);
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const ANALYSIS_MAX_TOKENS: u32 = 1000;
    pub const USER_AGENT: &'static str = "shotsearch/0.1";
}

/// Result shaping for ranked matches.
pub struct QueryConfig;

impl QueryConfig {
    /// Matches at or below this confidence are dropped.
    pub const MIN_CONFIDENCE: f64 = 0.3;
    pub const MAX_RESULTS: usize = 5;
}

/// Settings for an OpenAI-compatible chat completions provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Upper bound for a single remote call.
    pub timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: NetworkConfig::DEFAULT_BASE_URL.to_string(),
            model: NetworkConfig::DEFAULT_MODEL.to_string(),
            timeout: NetworkConfig::ANALYSIS_TIMEOUT,
        }
    }
}

impl ProviderSettings {
    /// Chat completions endpoint for the configured base URL.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
