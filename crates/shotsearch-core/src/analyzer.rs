//! Vision analyzer interface.

use crate::catalog::Metadata;
use crate::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Turns an image into a structured description.
///
/// Implementations talk to a remote vision model; they may be slow and may
/// fail. The returned mapping is stored as-is (plus `size` and `format`).
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Analyze the image at `path`.
    async fn analyze(&self, path: &Path) -> Result<Metadata>;
}

/// Shared handle to an analyzer.
pub type DynVisionAnalyzer = Arc<dyn VisionAnalyzer>;
