//! Builder for configuring ShotSearch initialization.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::analyzer::DynVisionAnalyzer;
use crate::catalog::CatalogStore;
use crate::config::{IndexConfig, NetworkConfig};
use crate::provider::OpenAiClient;
use crate::reconciler::Reconciler;
use crate::responder::DynQueryResponder;
use crate::search::SearchService;
use crate::{Result, ShotSearch, ShotSearchError};

/// Builder for configuring ShotSearch initialization.
///
/// The analyzer and responder are required; everything else has a default.
///
/// # Example
///
/// ```rust,ignore
/// use shotsearch_core::{OpenAiClient, ProviderSettings, ShotSearch};
/// use std::sync::Arc;
///
/// let client = Arc::new(OpenAiClient::new(ProviderSettings::default())?);
/// let api = ShotSearch::builder("./screenshots")
///     .database_path("./screenshots.db")
///     .with_provider(client)
///     .build()?;
/// ```
pub struct ShotSearchBuilder {
    screenshots_dir: PathBuf,
    database_path: Option<PathBuf>,
    analyzer: Option<DynVisionAnalyzer>,
    responder: Option<DynQueryResponder>,
    concurrency: usize,
    analysis_timeout: Duration,
    query_timeout: Duration,
}

impl ShotSearchBuilder {
    /// Create a new builder watching `screenshots_dir`.
    pub fn new(screenshots_dir: impl Into<PathBuf>) -> Self {
        Self {
            screenshots_dir: screenshots_dir.into(),
            database_path: None,
            analyzer: None,
            responder: None,
            concurrency: IndexConfig::DEFAULT_CONCURRENCY,
            analysis_timeout: NetworkConfig::ANALYSIS_TIMEOUT,
            query_timeout: NetworkConfig::QUERY_TIMEOUT,
        }
    }

    /// Location of the SQLite catalog.
    ///
    /// Default: `screenshots.db` in the working directory.
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn analyzer(mut self, analyzer: DynVisionAnalyzer) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn responder(mut self, responder: DynQueryResponder) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Use one provider client for both analysis and ranking.
    pub fn with_provider(self, client: Arc<OpenAiClient>) -> Self {
        self.analyzer(client.clone()).responder(client)
    }

    /// Maximum concurrent analyzer calls per pass.
    ///
    /// Default: 4
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Upper bound for one analyzer call; expiry counts as a per-file failure.
    pub fn analysis_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout = timeout;
        self
    }

    /// Upper bound for one responder call.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Open the catalog and wire the components together.
    pub fn build(self) -> Result<ShotSearch> {
        let analyzer = self.analyzer.ok_or_else(|| ShotSearchError::Config {
            message: "A vision analyzer is required".to_string(),
        })?;
        let responder = self.responder.ok_or_else(|| ShotSearchError::Config {
            message: "A query responder is required".to_string(),
        })?;

        let database_path = self
            .database_path
            .unwrap_or_else(|| PathBuf::from(IndexConfig::DEFAULT_DATABASE_FILE));
        let store = CatalogStore::open(database_path)?;

        let reconciler = Reconciler::new(
            self.screenshots_dir.clone(),
            store.clone(),
            analyzer,
            self.concurrency,
            self.analysis_timeout,
        );
        let search = SearchService::new(store.clone(), responder, self.query_timeout);

        Ok(ShotSearch {
            screenshots_dir: self.screenshots_dir,
            store,
            reconciler,
            search,
        })
    }
}
