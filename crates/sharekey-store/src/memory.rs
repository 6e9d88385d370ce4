//! In-memory implementation of the IndexStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use sharekey_core::{FolderId, PathId};

use crate::error::{Result, StoreError};
use crate::traits::{FileRecord, FolderRecord, IndexStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Folders indexed by ID.
    folders: HashMap<FolderId, FolderRecord>,

    /// File records per folder, ordered by path ID.
    files: HashMap<FolderId, BTreeMap<PathId, FileRecord>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndexStore for MemoryStore {
    async fn register_folder(&self, folder: &FolderRecord) -> Result<bool> {
        let mut inner = self.write()?;
        if inner.folders.contains_key(&folder.folder_id) {
            return Ok(false);
        }
        inner.folders.insert(folder.folder_id, folder.clone());
        Ok(true)
    }

    async fn unregister_folder(&self, folder_id: &FolderId) -> Result<bool> {
        let mut inner = self.write()?;
        inner.files.remove(folder_id);
        Ok(inner.folders.remove(folder_id).is_some())
    }

    async fn folder(&self, folder_id: &FolderId) -> Result<Option<FolderRecord>> {
        Ok(self.read()?.folders.get(folder_id).cloned())
    }

    async fn list_folders(&self) -> Result<Vec<FolderRecord>> {
        let inner = self.read()?;
        let mut folders: Vec<_> = inner.folders.values().cloned().collect();
        folders.sort_by(|a, b| a.folder_id.cmp(&b.folder_id));
        Ok(folders)
    }

    async fn put_file(&self, file: &FileRecord) -> Result<()> {
        let mut inner = self.write()?;
        if !inner.folders.contains_key(&file.folder_id) {
            return Err(StoreError::NotFound(format!("folder {}", file.folder_id)));
        }
        inner
            .files
            .entry(file.folder_id)
            .or_default()
            .insert(file.path_id, file.clone());
        Ok(())
    }

    async fn get_file(&self, folder_id: &FolderId, path_id: &PathId) -> Result<Option<FileRecord>> {
        let inner = self.read()?;
        Ok(inner
            .files
            .get(folder_id)
            .and_then(|files| files.get(path_id))
            .cloned())
    }

    async fn list_files(&self, folder_id: &FolderId) -> Result<Vec<FileRecord>> {
        let inner = self.read()?;
        Ok(inner
            .files
            .get(folder_id)
            .map(|files| files.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use sharekey_core::{PrivilegeLevel, SecretSignature};

    fn folder(byte: u8) -> FolderRecord {
        FolderRecord {
            folder_id: FolderId::from_bytes([byte; 32]),
            path: "/tmp/share".into(),
            level: PrivilegeLevel::Download,
            added_at: 1,
        }
    }

    fn file(folder_id: FolderId, byte: u8) -> FileRecord {
        FileRecord {
            folder_id,
            path_id: PathId::from_bytes([byte; 32]),
            encrypted_path: Bytes::new(),
            meta: Bytes::from_static(b"meta"),
            signature: SecretSignature::from_bytes([0; 64]),
            updated_at: 2,
        }
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let store = MemoryStore::new();
        let mut record = folder(1);
        assert!(store.register_folder(&record).await.unwrap());

        record.path = "/elsewhere".into();
        assert!(!store.register_folder(&record).await.unwrap());

        let kept = store.folder(&record.folder_id).await.unwrap().unwrap();
        assert_eq!(kept.path, "/tmp/share");
    }

    #[tokio::test]
    async fn test_files_ordered_by_path_id() {
        let store = MemoryStore::new();
        let a = folder(1);
        store.register_folder(&a).await.unwrap();
        store.put_file(&file(a.folder_id, 9)).await.unwrap();
        store.put_file(&file(a.folder_id, 2)).await.unwrap();

        let ids: Vec<_> = store
            .list_files(&a.folder_id)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.path_id)
            .collect();
        assert_eq!(ids, vec![PathId::from_bytes([2; 32]), PathId::from_bytes([9; 32])]);
    }

    #[tokio::test]
    async fn test_put_file_requires_folder() {
        let store = MemoryStore::new();
        let err = store
            .put_file(&file(FolderId::from_bytes([4; 32]), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unregister_drops_files() {
        let store = MemoryStore::new();
        let a = folder(1);
        store.register_folder(&a).await.unwrap();
        store.put_file(&file(a.folder_id, 3)).await.unwrap();

        assert!(store.unregister_folder(&a.folder_id).await.unwrap());
        assert!(store
            .get_file(&a.folder_id, &PathId::from_bytes([3; 32]))
            .await
            .unwrap()
            .is_none());
        assert!(store.list_folders().await.unwrap().is_empty());
    }
}
