//! Database schema migrations for SQLite.
//!
//! Versioned migrations: each one transforms the schema from version N to
//! N+1 and is recorded in `schema_migrations`.

use crate::db::{SqlValue, SqliteDb};
use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: i64 = 1;

/// Initialize or migrate the database schema.
///
/// Idempotent: safe to call on every open.
pub fn migrate(db: &SqliteDb) -> Result<()> {
    db.exec_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
    )?;

    let current = current_version(db)?;
    if current >= CURRENT_VERSION {
        return Ok(());
    }

    let savepoint = db.savepoint("migrate")?;
    for version in (current + 1)..=CURRENT_VERSION {
        apply_migration(db, version)?;
        db.exec(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (:version, :applied_at)",
            &[
                (":version", SqlValue::from(version)),
                (":applied_at", SqlValue::from(now_millis())),
            ],
        )?;
        tracing::debug!(version, "applied index schema migration");
    }
    savepoint.commit()
}

/// The highest applied migration, or 0 for a fresh database.
pub fn current_version(db: &SqliteDb) -> Result<i64> {
    let result = db.exec("SELECT COALESCE(MAX(version), 0) FROM schema_migrations", &[])?;
    result
        .first()
        .and_then(|row| row.get(0))
        .and_then(SqlValue::as_integer)
        .ok_or_else(|| StoreError::Migration("schema_migrations returned no version".into()))
}

/// Apply a specific migration version.
fn apply_migration(db: &SqliteDb, version: i64) -> Result<()> {
    match version {
        1 => apply_v1(db),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: folders and their file records.
fn apply_v1(db: &SqliteDb) -> Result<()> {
    db.exec_batch(
        r#"
        -- Folders joined on this node
        CREATE TABLE folders (
            folder_id BLOB PRIMARY KEY,       -- 32 bytes, derived from the share's download key
            path TEXT NOT NULL,               -- local directory
            level TEXT NOT NULL,              -- type char of the secret the folder was joined with
            added_at INTEGER NOT NULL         -- Unix ms
        );

        -- File metadata records, scoped by folder
        CREATE TABLE files (
            folder_id BLOB NOT NULL REFERENCES folders(folder_id) ON DELETE CASCADE,
            path_id BLOB NOT NULL,            -- 32 bytes, keyed hash of the path
            encrypted_path BLOB NOT NULL,     -- nonce || ciphertext
            meta BLOB NOT NULL,               -- opaque signed metadata
            signature BLOB NOT NULL,          -- 64 bytes, ECDSA P-256 over meta
            updated_at INTEGER NOT NULL,      -- Unix ms
            PRIMARY KEY (folder_id, path_id)
        );

        CREATE INDEX idx_files_folder ON files(folder_id);
        "#,
    )
}

/// Get current time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let db = SqliteDb::open_memory().unwrap();
        migrate(&db).unwrap();

        let tables: Vec<String> = db
            .exec("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name", &[])
            .unwrap()
            .iter()
            .filter_map(|row| row.get(0).and_then(SqlValue::as_text).map(String::from))
            .collect();

        assert!(tables.contains(&"folders".to_string()));
        assert!(tables.contains(&"files".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_migration_idempotent() {
        let db = SqliteDb::open_memory().unwrap();
        migrate(&db).unwrap();
        migrate(&db).unwrap();
        migrate(&db).unwrap();

        assert_eq!(current_version(&db).unwrap(), CURRENT_VERSION);
    }
}
