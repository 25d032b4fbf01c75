//! Watched-directory listing.

use crate::config::IndexConfig;
use crate::{Result, ShotSearchError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Check whether a path has an allow-listed image extension (case-insensitive).
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IndexConfig::SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// List eligible image files directly inside `directory`, keyed by filename.
///
/// A missing directory is created and yields an empty listing. Subdirectories
/// are never entered; symlinks are followed so a linked image counts as a
/// regular file.
pub fn list_eligible(directory: &Path) -> Result<BTreeMap<String, PathBuf>> {
    if !directory.exists() {
        std::fs::create_dir_all(directory).map_err(|e| ShotSearchError::Io {
            message: format!("Failed to create directory {}", directory.display()),
            path: Some(directory.to_path_buf()),
            source: Some(e),
        })?;
        debug!("Created missing screenshots directory {}", directory.display());
        return Ok(BTreeMap::new());
    }

    let mut files = BTreeMap::new();
    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Dangling symlinks and unreadable entries are skipped
                warn!("Skipping unreadable entry in {}: {}", directory.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_supported_extension(entry.path()) {
            continue;
        }

        match entry.file_name().to_str() {
            Some(name) => {
                files.insert(name.to_string(), entry.path().to_path_buf());
            }
            None => warn!("Skipping non UTF-8 filename: {:?}", entry.file_name()),
        }
    }

    Ok(files)
}
