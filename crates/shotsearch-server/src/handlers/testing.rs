//! Fakes for router tests.

use crate::server::AppState;
use async_trait::async_trait;
use serde_json::json;
use shotsearch_core::{
    Candidate, ChatReply, ChatTurn, Match, Metadata, QueryResponder, Result, ShotSearch,
    ShotSearchError, VisionAnalyzer,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Stand-in for the remote model: describes every image, answers with a fixed ranking.
#[derive(Default)]
pub struct FakeProvider {
    pub matches: Vec<Match>,
    pub fail: bool,
}

impl FakeProvider {
    pub fn replying(matches: Vec<Match>) -> Self {
        Self {
            matches,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            matches: Vec::new(),
            fail: true,
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(ShotSearchError::Upstream {
                message: "model unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VisionAnalyzer for FakeProvider {
    async fn analyze(&self, path: &Path) -> Result<Metadata> {
        let mut metadata = Metadata::new();
        metadata.insert(
            "summary".to_string(),
            json!(format!("Screenshot {}", path.display())),
        );
        Ok(metadata)
    }
}

#[async_trait]
impl QueryResponder for FakeProvider {
    async fn rank(&self, _query: &str, _candidates: &[Candidate]) -> Result<Vec<Match>> {
        self.check()?;
        Ok(self.matches.clone())
    }

    async fn converse(
        &self,
        _query: &str,
        history: &[ChatTurn],
        _candidates: &[Candidate],
    ) -> Result<ChatReply> {
        self.check()?;
        Ok(ChatReply {
            message: format!("{} earlier turns considered", history.len()),
            results: self.matches.clone(),
        })
    }
}

/// Library over `<temp>/screenshots` with `provider` for both roles.
pub fn build_api(temp_dir: &TempDir, provider: Arc<FakeProvider>) -> ShotSearch {
    ShotSearch::builder(temp_dir.path().join("screenshots"))
        .database_path(temp_dir.path().join("screenshots.db"))
        .analyzer(provider.clone())
        .responder(provider)
        .build()
        .expect("Failed to build api")
}

pub fn build_state(temp_dir: &TempDir, provider: Arc<FakeProvider>) -> Arc<AppState> {
    Arc::new(AppState {
        api: build_api(temp_dir, provider),
    })
}

/// Write a small valid PNG into the watched directory.
pub fn write_png(temp_dir: &TempDir, name: &str) {
    let dir = temp_dir.path().join("screenshots");
    std::fs::create_dir_all(&dir).unwrap();
    image::RgbImage::new(3, 2)
        .save_with_format(dir.join(name), image::ImageFormat::Png)
        .unwrap();
}
