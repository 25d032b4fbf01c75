//! Error types for screenshot search.
//!
//! Per-file failures during indexing are reported through the same enum as
//! request-level failures; the reconciler decides which ones it contains.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for the screenshot search library.
#[derive(Debug, Error)]
pub enum ShotSearchError {
    // Catalog errors
    #[error("Screenshot already indexed: {filename}")]
    DuplicateKey { filename: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // Indexing errors
    #[error("Analysis failed for {filename}: {message}")]
    AnalysisFailed { filename: String, message: String },

    #[error("Image error: {message}")]
    Image {
        message: String,
        #[source]
        source: Option<image::ImageError>,
    },

    // Query errors
    #[error("{message}")]
    InvalidQuery { message: String },

    #[error("Upstream model error: {message}")]
    Upstream { message: String },

    #[error("Upstream model timed out after {0:?}")]
    UpstreamTimeout(Duration),

    // File system errors
    #[error("Image not found: {filename}")]
    NotFound { filename: String },

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for screenshot search operations.
pub type Result<T> = std::result::Result<T, ShotSearchError>;

impl From<std::io::Error> for ShotSearchError {
    fn from(err: std::io::Error) -> Self {
        ShotSearchError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for ShotSearchError {
    fn from(err: serde_json::Error) -> Self {
        ShotSearchError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for ShotSearchError {
    fn from(err: rusqlite::Error) -> Self {
        ShotSearchError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<image::ImageError> for ShotSearchError {
    fn from(err: image::ImageError) -> Self {
        ShotSearchError::Image {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl ShotSearchError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ShotSearchError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// HTTP status code the request layer should answer with.
    ///
    /// - 400: the caller sent something unusable (blank query)
    /// - 404: the requested image is not on disk
    /// - 409: unique-filename conflict
    /// - 500: everything else, including upstream model failures
    pub fn status_code(&self) -> u16 {
        match self {
            ShotSearchError::InvalidQuery { .. } => 400,
            ShotSearchError::NotFound { .. } => 404,
            ShotSearchError::DuplicateKey { .. } => 409,
            _ => 500,
        }
    }

    /// Check if this error came from the remote model provider.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ShotSearchError::Upstream { .. } | ShotSearchError::UpstreamTimeout(_)
        )
    }
}
