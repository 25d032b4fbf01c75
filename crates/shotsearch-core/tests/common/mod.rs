//! Fakes and fixtures shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use shotsearch_core::{
    Candidate, ChatReply, ChatTurn, Match, Metadata, QueryResponder, Result, ShotSearchError,
    VisionAnalyzer,
};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Analyzer that records calls and fails for chosen filenames.
#[derive(Default)]
pub struct FakeAnalyzer {
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
    fail_on: HashSet<String>,
    delay: Option<Duration>,
}

impl FakeAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            fail_on: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        let mut seen = self.seen.lock().unwrap().clone();
        seen.sort();
        seen
    }
}

#[async_trait]
impl VisionAnalyzer for FakeAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<Metadata> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        self.seen.lock().unwrap().push(name.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_on.contains(&name) {
            return Err(ShotSearchError::Upstream {
                message: format!("vision model rejected {}", name),
            });
        }

        let mut metadata = Metadata::new();
        metadata.insert("summary".to_string(), json!(format!("Screenshot {}", name)));
        metadata.insert("keywords".to_string(), json!(["fake"]));
        Ok(metadata)
    }
}

/// Responder that returns a canned reply and counts calls.
#[derive(Default)]
pub struct FakeResponder {
    calls: AtomicUsize,
    last_candidates: Mutex<Vec<Candidate>>,
    last_history: Mutex<Vec<ChatTurn>>,
    reply: Vec<Match>,
    fail: bool,
}

impl FakeResponder {
    pub fn replying(reply: Vec<Match>) -> Self {
        Self {
            reply,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_candidates(&self) -> Vec<Candidate> {
        self.last_candidates.lock().unwrap().clone()
    }

    pub fn last_history(&self) -> Vec<ChatTurn> {
        self.last_history.lock().unwrap().clone()
    }

    fn record(&self, candidates: &[Candidate]) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_candidates.lock().unwrap() = candidates.to_vec();
        if self.fail {
            return Err(ShotSearchError::Upstream {
                message: "ranking unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl QueryResponder for FakeResponder {
    async fn rank(&self, _query: &str, candidates: &[Candidate]) -> Result<Vec<Match>> {
        self.record(candidates)?;
        Ok(self.reply.clone())
    }

    async fn converse(
        &self,
        query: &str,
        history: &[ChatTurn],
        candidates: &[Candidate],
    ) -> Result<ChatReply> {
        self.record(candidates)?;
        *self.last_history.lock().unwrap() = history.to_vec();
        Ok(ChatReply {
            message: format!("Here is what I found for {}", query),
            results: self.reply.clone(),
        })
    }
}

/// Write a small valid PNG.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    image::RgbImage::new(width, height)
        .save_with_format(dir.join(name), image::ImageFormat::Png)
        .unwrap();
}

pub fn hit(id: i64, filename: &str, confidence: f64) -> Match {
    Match {
        id,
        filename: filename.to_string(),
        confidence,
        reason: format!("matches {}", filename),
    }
}
