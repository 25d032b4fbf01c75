//! Screenshot search core - index a folder of screenshots with a vision model
//! and answer natural-language queries against the resulting catalog.
//!
//! The crate is headless; the HTTP layer lives in `shotsearch-server`.
//!
//! # Example
//!
//! ```rust,ignore
//! use shotsearch_core::{OpenAiClient, ProviderSettings, ShotSearch};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> shotsearch_core::Result<()> {
//!     let client = Arc::new(OpenAiClient::new(ProviderSettings::default())?);
//!     let api = ShotSearch::builder("../screenshots").with_provider(client).build()?;
//!
//!     let report = api.reindex().await?;
//!     println!("{} screenshots indexed", report.total);
//!
//!     for hit in api.search("the error dialog from yesterday").await? {
//!         println!("{} ({:.2}): {}", hit.filename, hit.confidence, hit.reason);
//!     }
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod catalog;
pub mod config;
pub mod error;
pub mod probe;
pub mod provider;
pub mod reconciler;
pub mod responder;
pub mod scanner;
pub mod search;

mod builder;

pub use analyzer::{DynVisionAnalyzer, VisionAnalyzer};
pub use builder::ShotSearchBuilder;
pub use catalog::{CatalogEntry, CatalogStore, Metadata};
pub use config::ProviderSettings;
pub use error::{Result, ShotSearchError};
pub use provider::OpenAiClient;
pub use reconciler::{IndexFailure, ReconcileReport, Reconciler};
pub use responder::{Candidate, ChatReply, ChatTurn, DynQueryResponder, Match, QueryResponder, Role};
pub use search::SearchService;

use std::path::{Component, Path, PathBuf};

/// Main entry point: catalog, reconciler and search wired together.
pub struct ShotSearch {
    screenshots_dir: PathBuf,
    store: CatalogStore,
    reconciler: Reconciler,
    search: SearchService,
}

impl ShotSearch {
    /// Create a builder watching `screenshots_dir`.
    pub fn builder(screenshots_dir: impl Into<PathBuf>) -> ShotSearchBuilder {
        ShotSearchBuilder::new(screenshots_dir)
    }

    /// Get the watched directory.
    pub fn screenshots_dir(&self) -> &Path {
        &self.screenshots_dir
    }

    /// Get the catalog store.
    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Reconcile the catalog with the watched directory.
    pub async fn reindex(&self) -> Result<ReconcileReport> {
        self.reconciler.reconcile().await
    }

    /// Rank indexed screenshots against `query`.
    pub async fn search(&self, query: &str) -> Result<Vec<Match>> {
        self.search.search(query).await
    }

    /// Conversational search with prior turns as context.
    pub async fn chat(&self, query: &str, history: &[ChatTurn]) -> Result<ChatReply> {
        self.search.chat(query, history).await
    }

    /// All catalog entries, most recently indexed first.
    pub fn list_screenshots(&self) -> Result<Vec<CatalogEntry>> {
        self.store.list_all()
    }

    /// Resolve a bare filename inside the watched directory.
    ///
    /// Anything that is not a single normal path component, or does not
    /// exist as a file, is reported as not found.
    pub fn image_path(&self, filename: &str) -> Result<PathBuf> {
        let not_found = || ShotSearchError::NotFound {
            filename: filename.to_string(),
        };

        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(not_found()),
        }

        let path = self.screenshots_dir.join(filename);
        if !path.is_file() {
            return Err(not_found());
        }
        Ok(path)
    }

    /// Read an image from the watched directory with its content type.
    pub async fn read_image(&self, filename: &str) -> Result<(Vec<u8>, &'static str)> {
        let path = self.image_path(filename)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ShotSearchError::io_with_path(e, &path))?;
        Ok((bytes, probe::content_type_for(&path)))
    }
}
