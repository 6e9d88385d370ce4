//! SQLite implementation of the IndexStore trait.
//!
//! Every query goes through [`SqliteDb::exec`] with named parameters,
//! wrapped in async via `tokio::task::spawn_blocking`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use sharekey_core::{FolderId, PathId, PrivilegeLevel, SecretSignature};

use crate::db::{Row, SqlValue, SqliteDb};
use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{FileRecord, FolderRecord, IndexStore};

/// SQLite-based index store.
///
/// Thread-safe via internal Mutex.
pub struct SqliteStore {
    db: Arc<Mutex<SqliteDb>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(SqliteDb::open(path)?)
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        Self::init(SqliteDb::open_memory()?)
    }

    fn init(db: SqliteDb) -> Result<Self> {
        db.exec_batch("PRAGMA foreign_keys = ON")?;
        migration::migrate(&db)?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// Run `f` against the database on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&SqliteDb) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let db = db
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("mutex poisoned: {}", e)))?;
            f(&*db)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }
}

fn blob_column<'a>(row: &'a Row, idx: usize, name: &str) -> Result<&'a [u8]> {
    row.get(idx)
        .and_then(SqlValue::as_blob)
        .ok_or_else(|| StoreError::InvalidData(format!("column {} is not a blob", name)))
}

fn integer_column(row: &Row, idx: usize, name: &str) -> Result<i64> {
    row.get(idx)
        .and_then(SqlValue::as_integer)
        .ok_or_else(|| StoreError::InvalidData(format!("column {} is not an integer", name)))
}

fn text_column<'a>(row: &'a Row, idx: usize, name: &str) -> Result<&'a str> {
    row.get(idx)
        .and_then(SqlValue::as_text)
        .ok_or_else(|| StoreError::InvalidData(format!("column {} is not text", name)))
}

fn folder_id_column(row: &Row, idx: usize) -> Result<FolderId> {
    FolderId::try_from(blob_column(row, idx, "folder_id")?)
        .map_err(|_| StoreError::InvalidData("folder_id must be 32 bytes".into()))
}

fn level_from_column(text: &str) -> Result<PrivilegeLevel> {
    let mut chars = text.chars();
    match (chars.next().and_then(PrivilegeLevel::from_type_char), chars.next()) {
        (Some(level), None) => Ok(level),
        _ => Err(StoreError::InvalidData(format!("unknown folder level {:?}", text))),
    }
}

// Column order: folder_id, path, level, added_at
fn row_to_folder(row: &Row) -> Result<FolderRecord> {
    Ok(FolderRecord {
        folder_id: folder_id_column(row, 0)?,
        path: text_column(row, 1, "path")?.to_string(),
        level: level_from_column(text_column(row, 2, "level")?)?,
        added_at: integer_column(row, 3, "added_at")?,
    })
}

// Column order: folder_id, path_id, encrypted_path, meta, signature, updated_at
fn row_to_file(row: &Row) -> Result<FileRecord> {
    let path_id = PathId::try_from(blob_column(row, 1, "path_id")?)
        .map_err(|_| StoreError::InvalidData("path_id must be 32 bytes".into()))?;
    let signature = SecretSignature::try_from_slice(blob_column(row, 4, "signature")?)
        .map_err(|e| StoreError::InvalidData(e.to_string()))?;

    Ok(FileRecord {
        folder_id: folder_id_column(row, 0)?,
        path_id,
        encrypted_path: Bytes::copy_from_slice(blob_column(row, 2, "encrypted_path")?),
        meta: Bytes::copy_from_slice(blob_column(row, 3, "meta")?),
        signature,
        updated_at: integer_column(row, 5, "updated_at")?,
    })
}

const SELECT_FOLDER: &str = "SELECT folder_id, path, level, added_at FROM folders";
const SELECT_FILE: &str =
    "SELECT folder_id, path_id, encrypted_path, meta, signature, updated_at FROM files";

#[async_trait]
impl IndexStore for SqliteStore {
    async fn register_folder(&self, folder: &FolderRecord) -> Result<bool> {
        let folder = folder.clone();

        self.blocking(move |db| {
            db.exec(
                "INSERT OR IGNORE INTO folders (folder_id, path, level, added_at)
                 VALUES (:folder_id, :path, :level, :added_at)",
                &[
                    (":folder_id", SqlValue::from(folder.folder_id.as_bytes().as_slice())),
                    (":path", SqlValue::from(folder.path.as_str())),
                    (":level", SqlValue::from(folder.level.type_char().to_string())),
                    (":added_at", SqlValue::from(folder.added_at)),
                ],
            )?;
            let inserted = db.changes() > 0;
            if inserted {
                tracing::debug!(folder = %folder.folder_id, level = %folder.level, "registered folder");
            }
            Ok(inserted)
        })
        .await
    }

    async fn unregister_folder(&self, folder_id: &FolderId) -> Result<bool> {
        let folder_id = *folder_id;

        self.blocking(move |db| {
            let key = [(":folder_id", SqlValue::from(folder_id.as_bytes().as_slice()))];

            let savepoint = db.savepoint("unregister_folder")?;
            db.exec("DELETE FROM files WHERE folder_id = :folder_id", &key)?;
            db.exec("DELETE FROM folders WHERE folder_id = :folder_id", &key)?;
            let removed = db.changes() > 0;
            savepoint.commit()?;

            if removed {
                tracing::debug!(folder = %folder_id, "unregistered folder");
            }
            Ok(removed)
        })
        .await
    }

    async fn folder(&self, folder_id: &FolderId) -> Result<Option<FolderRecord>> {
        let folder_id = *folder_id;

        self.blocking(move |db| {
            let result = db.exec(
                &format!("{} WHERE folder_id = :folder_id", SELECT_FOLDER),
                &[(":folder_id", SqlValue::from(folder_id.as_bytes().as_slice()))],
            )?;
            result.first().map(row_to_folder).transpose()
        })
        .await
    }

    async fn list_folders(&self) -> Result<Vec<FolderRecord>> {
        self.blocking(|db| {
            db.exec(&format!("{} ORDER BY folder_id", SELECT_FOLDER), &[])?
                .iter()
                .map(row_to_folder)
                .collect()
        })
        .await
    }

    async fn put_file(&self, file: &FileRecord) -> Result<()> {
        let file = file.clone();

        self.blocking(move |db| {
            let folder_key = [(":folder_id", SqlValue::from(file.folder_id.as_bytes().as_slice()))];
            if db
                .exec("SELECT 1 FROM folders WHERE folder_id = :folder_id", &folder_key)?
                .is_empty()
            {
                return Err(StoreError::NotFound(format!("folder {}", file.folder_id)));
            }

            db.exec(
                "INSERT OR REPLACE INTO files
                    (folder_id, path_id, encrypted_path, meta, signature, updated_at)
                 VALUES (:folder_id, :path_id, :encrypted_path, :meta, :signature, :updated_at)",
                &[
                    (":folder_id", SqlValue::from(file.folder_id.as_bytes().as_slice())),
                    (":path_id", SqlValue::from(file.path_id.as_bytes().as_slice())),
                    (":encrypted_path", SqlValue::from(file.encrypted_path.to_vec())),
                    (":meta", SqlValue::from(file.meta.to_vec())),
                    (":signature", SqlValue::from(file.signature.as_bytes().as_slice())),
                    (":updated_at", SqlValue::from(file.updated_at)),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_file(&self, folder_id: &FolderId, path_id: &PathId) -> Result<Option<FileRecord>> {
        let folder_id = *folder_id;
        let path_id = *path_id;

        self.blocking(move |db| {
            let result = db.exec(
                &format!("{} WHERE folder_id = :folder_id AND path_id = :path_id", SELECT_FILE),
                &[
                    (":folder_id", SqlValue::from(folder_id.as_bytes().as_slice())),
                    (":path_id", SqlValue::from(path_id.as_bytes().as_slice())),
                ],
            )?;
            result.first().map(row_to_file).transpose()
        })
        .await
    }

    async fn list_files(&self, folder_id: &FolderId) -> Result<Vec<FileRecord>> {
        let folder_id = *folder_id;

        self.blocking(move |db| {
            db.exec(
                &format!("{} WHERE folder_id = :folder_id ORDER BY path_id", SELECT_FILE),
                &[(":folder_id", SqlValue::from(folder_id.as_bytes().as_slice()))],
            )?
            .iter()
            .map(row_to_file)
            .collect()
        })
        .await
    }
}
