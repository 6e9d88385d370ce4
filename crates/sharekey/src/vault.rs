//! The Vault: shared folders joined by secret, with signed file records.
//!
//! What a node can do with a folder is decided entirely by the secret it
//! presents: any level can join or leave, `ReadWrite` can record files,
//! `ReadOnly` can read and verify them.

use async_trait::async_trait;
use bytes::Bytes;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use sharekey_control::{ControlConfig, ControlError, ControlHandler, FolderRegistry};
use sharekey_core::{FolderId, PathId, PrivilegeLevel, Secret};
use sharekey_store::{now_millis, FileRecord, FolderRecord, IndexStore};

use crate::error::{Result, VaultError};

/// Configuration for the Vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Largest accepted file metadata, in bytes.
    pub max_meta_bytes: usize,
    /// Control surface policy.
    pub control: ControlConfig,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            max_meta_bytes: 64 * 1024,
            control: ControlConfig::default(),
        }
    }
}

impl VaultConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    ///
    /// The document and its `control` section must be JSON objects.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let control_is_object = value
            .get("control")
            .map_or(true, serde_json::Value::is_object);
        if !value.is_object() || !control_is_object {
            return Err(VaultError::Config(<serde_json::Error as serde::de::Error>::custom(
                "configuration sections must be JSON objects",
            )));
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// A file record that passed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedFile {
    /// The decrypted file path.
    pub path: String,
    /// Keyed hash of the path.
    pub path_id: PathId,
    /// The signed metadata.
    pub meta: Bytes,
    /// When the record was written (Unix ms).
    pub updated_at: i64,
}

/// The bytes a file record's signature covers.
///
/// Binding the folder and path IDs keeps a valid record from being replayed
/// under another path or folder.
pub fn file_message(folder_id: &FolderId, path_id: &PathId, meta: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(64 + meta.len());
    message.extend_from_slice(folder_id.as_bytes());
    message.extend_from_slice(path_id.as_bytes());
    message.extend_from_slice(meta);
    message
}

/// The main Vault struct.
pub struct Vault<S: IndexStore> {
    /// The storage backend.
    store: S,
    /// Configuration.
    config: VaultConfig,
}

impl<S: IndexStore> Vault<S> {
    /// Create a new vault over `store`.
    pub fn new(store: S, config: VaultConfig) -> Self {
        Self { store, config }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Folder Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Generate a new owner secret and register its folder at `path`.
    pub async fn create_folder(&self, path: &str) -> Result<Secret> {
        let secret = Secret::random(PrivilegeLevel::Owner)?;
        self.add_folder(&secret, path).await?;
        Ok(secret)
    }

    /// Join the folder `secret` belongs to.
    ///
    /// Joining an already registered folder keeps the existing record and
    /// returns its ID.
    pub async fn add_folder(&self, secret: &Secret, path: &str) -> Result<FolderId> {
        let folder_id = secret.folder_id();
        let record = FolderRecord {
            folder_id,
            path: path.to_string(),
            level: secret.level(),
            added_at: now_millis(),
        };

        if self.store.register_folder(&record).await? {
            tracing::info!(folder = %folder_id, level = %secret.level(), "joined folder");
        } else {
            tracing::debug!(folder = %folder_id, "folder already joined");
        }
        Ok(folder_id)
    }

    /// Leave a folder, dropping its file records.
    pub async fn remove_folder(&self, folder_id: &FolderId) -> Result<bool> {
        let removed = self.store.unregister_folder(folder_id).await?;
        if removed {
            tracing::info!(folder = %folder_id, "left folder");
        }
        Ok(removed)
    }

    /// Get a folder record.
    pub async fn folder(&self, folder_id: &FolderId) -> Result<Option<FolderRecord>> {
        Ok(self.store.folder(folder_id).await?)
    }

    /// List joined folders.
    pub async fn folders(&self) -> Result<Vec<FolderRecord>> {
        Ok(self.store.list_folders().await?)
    }

    async fn require_folder(&self, folder_id: &FolderId) -> Result<FolderRecord> {
        self.store
            .folder(folder_id)
            .await?
            .ok_or(VaultError::FolderNotFound(*folder_id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Sign and store the metadata of one file.
    ///
    /// Needs a `ReadWrite` secret. The path is stored only encrypted and as
    /// a keyed hash.
    pub async fn record_file(&self, secret: &Secret, path: &str, meta: &[u8]) -> Result<FileRecord> {
        secret.require(PrivilegeLevel::ReadWrite)?;
        if meta.len() > self.config.max_meta_bytes {
            return Err(VaultError::MetaTooLarge {
                size: meta.len(),
                limit: self.config.max_meta_bytes,
            });
        }

        let folder_id = secret.folder_id();
        self.require_folder(&folder_id).await?;

        let path_id = secret.path_id(path)?;
        let signature = secret.sign(&file_message(&folder_id, &path_id, meta))?;
        let record = FileRecord {
            folder_id,
            path_id,
            encrypted_path: Bytes::from(secret.encrypt(path.as_bytes(), &mut OsRng)?),
            meta: Bytes::copy_from_slice(meta),
            signature,
            updated_at: now_millis(),
        };

        self.store.put_file(&record).await?;
        tracing::debug!(folder = %folder_id, "recorded file");
        Ok(record)
    }

    /// Load and verify the record of one file.
    ///
    /// Needs a `ReadOnly` secret. Fails with a crypto error if the signature
    /// does not verify.
    pub async fn verify_file(&self, secret: &Secret, path: &str) -> Result<VerifiedFile> {
        secret.require(PrivilegeLevel::ReadOnly)?;

        let folder_id = secret.folder_id();
        let path_id = secret.path_id(path)?;
        let record = self
            .store
            .get_file(&folder_id, &path_id)
            .await?
            .ok_or(VaultError::FileNotFound(folder_id))?;

        verify_record(secret, record)
    }

    /// Verify every record of the folder `secret` belongs to.
    ///
    /// Stops at the first record that fails.
    pub async fn verify_folder(&self, secret: &Secret) -> Result<Vec<VerifiedFile>> {
        secret.require(PrivilegeLevel::ReadOnly)?;

        let folder_id = secret.folder_id();
        self.require_folder(&folder_id).await?;

        let records = self.store.list_files(&folder_id).await?;
        let verified = records
            .into_iter()
            .map(|record| verify_record(secret, record))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(folder = %folder_id, files = verified.len(), "verified folder");
        Ok(verified)
    }

    /// Serve the control surface with this vault as the folder registry.
    pub fn into_control_handler(self) -> ControlHandler<Self> {
        let config = self.config.control.clone();
        ControlHandler::new(self, config)
    }
}

fn verify_record(secret: &Secret, record: FileRecord) -> Result<VerifiedFile> {
    let message = file_message(&record.folder_id, &record.path_id, &record.meta);
    if let Err(e) = secret.verify(&message, &record.signature) {
        tracing::warn!(folder = %record.folder_id, "file record signature rejected");
        return Err(e.into());
    }

    let path_bytes = secret.decrypt(&record.encrypted_path)?;
    let path = String::from_utf8(path_bytes).map_err(|_| VaultError::RecordMismatch {
        folder_id: record.folder_id,
        reason: "decrypted path is not UTF-8".into(),
    })?;
    if secret.path_id(&path)? != record.path_id {
        return Err(VaultError::RecordMismatch {
            folder_id: record.folder_id,
            reason: "path does not hash to the record's path ID".into(),
        });
    }

    Ok(VerifiedFile {
        path,
        path_id: record.path_id,
        meta: record.meta,
        updated_at: record.updated_at,
    })
}

#[async_trait]
impl<S: IndexStore> FolderRegistry for Vault<S> {
    async fn add_folder(&self, secret: &Secret, path: &str) -> sharekey_control::Result<FolderId> {
        Vault::add_folder(self, secret, path)
            .await
            .map_err(ControlError::from)
    }

    async fn remove_folder(&self, folder_id: &FolderId) -> sharekey_control::Result<bool> {
        Vault::remove_folder(self, folder_id)
            .await
            .map_err(ControlError::from)
    }
}
