//! IndexStore trait: the abstract interface for folder metadata persistence.
//!
//! Every file operation is scoped by a [`FolderId`]. The store only ever
//! sees identifiers and opaque, already-encrypted or already-signed bytes;
//! secrets themselves stay with the caller.

use async_trait::async_trait;
use bytes::Bytes;
use sharekey_core::{FolderId, PathId, PrivilegeLevel, SecretSignature};

use crate::error::Result;

/// A folder joined on this node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRecord {
    /// Identifier shared by every secret of the folder's share.
    pub folder_id: FolderId,
    /// Local directory the folder is synchronized into.
    pub path: String,
    /// Level of the secret the folder was joined with.
    pub level: PrivilegeLevel,
    /// When the folder was added (Unix ms).
    pub added_at: i64,
}

/// Metadata of one file in a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// The folder this record belongs to.
    pub folder_id: FolderId,
    /// Keyed hash of the file path.
    pub path_id: PathId,
    /// The file path, encrypted under the folder's encryption key.
    pub encrypted_path: Bytes,
    /// Opaque metadata bytes covered by `signature`.
    pub meta: Bytes,
    /// Signature over `meta` by the folder's signing key.
    pub signature: SecretSignature,
    /// When this record was last written (Unix ms).
    pub updated_at: i64,
}

/// Async interface for the metadata index.
///
/// All methods are async so SQLite work can be moved off the runtime with
/// `spawn_blocking`.
#[async_trait]
pub trait IndexStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Folder Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a folder. Returns `false` if it was already registered, in
    /// which case the existing record is kept.
    async fn register_folder(&self, folder: &FolderRecord) -> Result<bool>;

    /// Remove a folder and all of its file records. Returns `false` if the
    /// folder was not registered.
    async fn unregister_folder(&self, folder_id: &FolderId) -> Result<bool>;

    /// Get a folder by ID.
    async fn folder(&self, folder_id: &FolderId) -> Result<Option<FolderRecord>>;

    /// List all registered folders, ordered by ID.
    async fn list_folders(&self) -> Result<Vec<FolderRecord>>;

    // ─────────────────────────────────────────────────────────────────────────
    // File Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert or replace a file record.
    ///
    /// Fails with `NotFound` if the record's folder is not registered.
    async fn put_file(&self, file: &FileRecord) -> Result<()>;

    /// Get a file record.
    async fn get_file(&self, folder_id: &FolderId, path_id: &PathId) -> Result<Option<FileRecord>>;

    /// List every file record of a folder, ordered by path ID.
    async fn list_files(&self, folder_id: &FolderId) -> Result<Vec<FileRecord>>;
}
