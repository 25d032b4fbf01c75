//! SQLite catalog store.

use super::{CatalogEntry, Metadata};
use crate::{Result, ShotSearchError};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const SELECT_COLUMNS: &str = "SELECT id, filename, filepath, metadata_json, indexed_at FROM screenshots";

/// SQLite-backed catalog keyed by filename.
///
/// All statements run in autocommit mode on a single connection guarded by a
/// mutex, so each call is committed before it returns and writers never
/// interleave.
#[derive(Clone)]
pub struct CatalogStore {
    db_path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl CatalogStore {
    /// Create or open a catalog at the given path.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| ShotSearchError::Io {
                    message: format!("Failed to create directory {}", parent.display()),
                    path: Some(parent.to_path_buf()),
                    source: Some(e),
                })?;
            }
        }

        let conn = Connection::open(&db_path)?;
        Self::configure_connection(&conn)?;
        Self::ensure_schema(&conn)?;

        Ok(Self {
            db_path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// WAL with full sync: a committed write survives a crash.
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA busy_timeout=30000;
            PRAGMA synchronous=FULL;
            ",
        )?;
        Ok(())
    }

    fn ensure_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS screenshots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT UNIQUE NOT NULL,
                filepath TEXT NOT NULL,
                metadata_json TEXT NOT NULL,
                indexed_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_screenshots_indexed ON screenshots(indexed_at)",
            [],
        )?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| ShotSearchError::Database {
            message: "Failed to acquire connection lock".to_string(),
            source: None,
        })
    }

    /// Get the database path.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Insert a new entry and return its id.
    ///
    /// Fails with [`ShotSearchError::DuplicateKey`] if `filename` is already
    /// present; existing entries are never overwritten.
    pub fn upsert_create(&self, filename: &str, filepath: &str, metadata: &Metadata) -> Result<i64> {
        let metadata_json = serde_json::to_string(metadata)?;
        let indexed_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT INTO screenshots (filename, filepath, metadata_json, indexed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![filename, filepath, metadata_json, indexed_at],
        );

        match inserted {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                debug!("Inserted screenshot {} as id {}", filename, id);
                Ok(id)
            }
            Err(e) => Err(Self::insert_error(filename, e)),
        }
    }

    /// Only a UNIQUE violation means the filename is taken; other constraint
    /// failures stay database errors.
    fn insert_error(filename: &str, err: rusqlite::Error) -> ShotSearchError {
        match err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                ShotSearchError::DuplicateKey {
                    filename: filename.to_string(),
                }
            }
            e => e.into(),
        }
    }

    /// Remove an entry by filename. Returns false if there was nothing to remove.
    pub fn remove(&self, filename: &str) -> Result<bool> {
        let conn = self.lock()?;
        let rows_affected =
            conn.execute("DELETE FROM screenshots WHERE filename = ?1", params![filename])?;

        if rows_affected > 0 {
            debug!("Removed screenshot: {}", filename);
        }

        Ok(rows_affected > 0)
    }

    /// All entries, most recently indexed first.
    pub fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY indexed_at DESC, id DESC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::row_to_entry)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// Get an entry by filename.
    pub fn get(&self, filename: &str) -> Result<Option<CatalogEntry>> {
        let conn = self.lock()?;
        let entry = conn
            .query_row(
                &format!("{} WHERE filename = ?1", SELECT_COLUMNS),
                params![filename],
                Self::row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    /// The set of indexed filenames.
    pub fn filenames(&self) -> Result<BTreeSet<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT filename FROM screenshots")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut names = BTreeSet::new();
        for row in rows {
            names.insert(row?);
        }
        Ok(names)
    }

    /// Get the number of entries.
    pub fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: usize = conn.query_row("SELECT COUNT(*) FROM screenshots", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_entry(row: &Row) -> rusqlite::Result<CatalogEntry> {
        let metadata_json: String = row.get(3)?;
        let indexed_at: String = row.get(4)?;

        let metadata: Metadata = serde_json::from_str(&metadata_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let indexed_at = DateTime::parse_from_rfc3339(&indexed_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
            })?;

        Ok(CatalogEntry {
            id: row.get(0)?,
            filename: row.get(1)?,
            filepath: row.get(2)?,
            metadata,
            indexed_at,
        })
    }
}
