//! Directory/catalog reconciliation.
//!
//! Each pass re-lists the watched directory, diffs it against the catalog by
//! filename, removes entries whose files are gone and analyzes files the
//! catalog has not seen. Presence is all that is compared: a file whose
//! name is already indexed is never analyzed again.

use crate::analyzer::DynVisionAnalyzer;
use crate::catalog::CatalogStore;
use crate::probe::probe_image;
use crate::scanner;
use crate::{Result, ShotSearchError};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A file that could not be indexed during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFailure {
    pub filename: String,
    pub error: String,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Eligible files found in the directory.
    pub files_found: usize,
    /// Files not yet in the catalog that were submitted for analysis.
    pub new_files: usize,
    /// New files that made it into the catalog.
    pub indexed: usize,
    /// New files that could not be indexed this pass; see `failures`.
    pub failed: usize,
    /// Catalog entries removed because their file disappeared.
    pub removed: usize,
    /// Catalog size before the pass plus `indexed` minus `removed`.
    ///
    /// Derived, not re-queried; a concurrent writer outside the reconciler
    /// can make it disagree with the stored count.
    pub total: usize,
    pub failures: Vec<IndexFailure>,
}

/// Brings the catalog into agreement with the watched directory.
pub struct Reconciler {
    screenshots_dir: PathBuf,
    store: CatalogStore,
    analyzer: DynVisionAnalyzer,
    concurrency: usize,
    analysis_timeout: Duration,
    /// Held for the duration of a pass so runs never overlap.
    run_lock: Mutex<()>,
}

impl Reconciler {
    pub fn new(
        screenshots_dir: impl Into<PathBuf>,
        store: CatalogStore,
        analyzer: DynVisionAnalyzer,
        concurrency: usize,
        analysis_timeout: Duration,
    ) -> Self {
        Self {
            screenshots_dir: screenshots_dir.into(),
            store,
            analyzer,
            concurrency: concurrency.max(1),
            analysis_timeout,
            run_lock: Mutex::new(()),
        }
    }

    /// Get the watched directory.
    pub fn screenshots_dir(&self) -> &Path {
        &self.screenshots_dir
    }

    /// Run one reconciliation pass.
    ///
    /// Per-file analysis, probe and insert failures are logged and collected
    /// in the report; only directory listing and catalog read/remove errors
    /// fail the pass.
    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        let _guard = self.run_lock.lock().await;

        info!("Scanning screenshots directory {}", self.screenshots_dir.display());
        let current = scanner::list_eligible(&self.screenshots_dir)?;
        info!("Found {} image files", current.len());

        // An empty listing never clears the catalog: a missing or unmounted
        // directory looks exactly like this.
        if current.is_empty() {
            warn!(
                "No screenshots found. Add images to {}",
                self.screenshots_dir.display()
            );
            return Ok(ReconcileReport {
                total: self.store.count()?,
                ..Default::default()
            });
        }

        let existing = self.store.filenames()?;
        let previous_total = existing.len();

        let mut report = ReconcileReport {
            files_found: current.len(),
            ..Default::default()
        };

        for stale in existing.iter().filter(|name| !current.contains_key(*name)) {
            info!("Removing deleted file from catalog: {}", stale);
            if self.store.remove(stale)? {
                report.removed += 1;
            }
        }

        let fresh: Vec<(String, PathBuf)> = current
            .into_iter()
            .filter(|(name, _)| !existing.contains(name))
            .collect();
        report.new_files = fresh.len();

        if fresh.is_empty() {
            info!("All screenshots are already indexed");
        } else {
            info!("Found {} new screenshots to index", fresh.len());

            let total_new = fresh.len();
            let outcomes: Vec<(String, Result<i64>)> = stream::iter(fresh.into_iter().enumerate())
                .map(|(i, (name, path))| async move {
                    debug!("[{}/{}] Analyzing {}", i + 1, total_new, name);
                    let outcome = self.index_file(&name, &path).await;
                    (name, outcome)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

            for (name, outcome) in outcomes {
                match outcome {
                    Ok(id) => {
                        info!("Indexed {} (id {})", name, id);
                        report.indexed += 1;
                    }
                    Err(e) => {
                        warn!("Error indexing {}: {}", name, e);
                        report.failed += 1;
                        report.failures.push(IndexFailure {
                            filename: name,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        report.total = previous_total - report.removed + report.indexed;
        info!(
            "Indexing complete: {} indexed, {} failed, {} removed, {} total",
            report.indexed,
            report.failed,
            report.removed,
            report.total
        );

        Ok(report)
    }

    /// Analyze, probe and insert a single file.
    async fn index_file(&self, filename: &str, path: &Path) -> Result<i64> {
        let mut metadata =
            match tokio::time::timeout(self.analysis_timeout, self.analyzer.analyze(path)).await {
                Ok(result) => result?,
                Err(_) => return Err(ShotSearchError::UpstreamTimeout(self.analysis_timeout)),
            };

        let probe_path = path.to_path_buf();
        let probe = tokio::task::spawn_blocking(move || probe_image(&probe_path))
            .await
            .map_err(|e| ShotSearchError::AnalysisFailed {
                filename: filename.to_string(),
                message: format!("Probe task failed: {}", e),
            })??;

        metadata.insert("size".to_string(), json!(probe.size()));
        metadata.insert("format".to_string(), json!(probe.format_name()));

        self.store
            .upsert_create(filename, &path.to_string_lossy(), &metadata)
    }
}
