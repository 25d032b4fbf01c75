//! Persisted catalog of indexed screenshots.
//!
//! One SQLite table keyed by filename. The reconciler is the only writer in
//! normal operation; the HTTP layer reads through [`CatalogStore::list_all`].

mod store;

pub use store::CatalogStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Open-ended attribute mapping returned by the vision model, extended with
/// locally probed `size` and `format`.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A screenshot record in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub filename: String,
    pub filepath: String,
    pub metadata: Metadata,
    pub indexed_at: DateTime<Utc>,
}
