//! Durable store access: one SQLite database holding whole-collection
//! key/value records.
//!
//! Each owned collection (blueprints, contracts) is persisted as a single
//! JSON array under its own key. Every mutation overwrites the full
//! collection; there are no incremental patches. A missing database,
//! missing key, or unreadable value all mean "empty collection", never an
//! error, so a fresh workspace and a corrupt record both degrade to a
//! clean start.

use crate::core::error::CountersignError;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const PLATFORM_DB_NAME: &str = "countersign.db";

const COLLECTIONS_SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS collections (key TEXT PRIMARY KEY, value TEXT NOT NULL)";

pub fn db_connect(db_path: &str) -> Result<Connection, CountersignError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(CountersignError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(CountersignError::RusqliteError)?;
    Ok(conn)
}

pub fn platform_db_path(root: &Path) -> PathBuf {
    root.join(PLATFORM_DB_NAME)
}

pub fn initialize_platform_db(root: &Path) -> Result<(), CountersignError> {
    fs::create_dir_all(root).map_err(CountersignError::IoError)?;
    let db_path = platform_db_path(root);
    let conn = db_connect(&db_path.to_string_lossy())?;
    conn.execute(COLLECTIONS_SCHEMA, [])?;
    Ok(())
}

/// Read the full collection stored under `key`, seeding in-memory state.
///
/// Absence of the database file, the key, or a parsable value yields an
/// empty collection.
pub fn load_collection<T: DeserializeOwned>(
    root: &Path,
    key: &str,
) -> Result<Vec<T>, CountersignError> {
    let db_path = platform_db_path(root);
    if !db_path.exists() {
        return Ok(Vec::new());
    }

    let conn = db_connect(&db_path.to_string_lossy())?;
    conn.execute(COLLECTIONS_SCHEMA, [])?;
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM collections WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;

    Ok(raw
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default())
}

/// Overwrite the full collection stored under `key`.
pub fn save_collection<T: Serialize>(
    root: &Path,
    key: &str,
    items: &[T],
) -> Result<(), CountersignError> {
    fs::create_dir_all(root).map_err(CountersignError::IoError)?;
    let db_path = platform_db_path(root);
    let conn = db_connect(&db_path.to_string_lossy())?;
    conn.execute(COLLECTIONS_SCHEMA, [])?;

    let payload = serde_json::to_string(items)?;
    conn.execute(
        "INSERT OR REPLACE INTO collections(key, value) VALUES(?1, ?2)",
        params![key, payload],
    )?;
    Ok(())
}

// Store modules own their collection keys. Avoid a generic "register your
// collection" API until a second durable medium actually exists.
