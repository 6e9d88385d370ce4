//! Error types for the vault.

use sharekey_control::ControlError;
use sharekey_core::{FolderId, SecretError};
use sharekey_store::StoreError;
use thiserror::Error;

/// Errors that can occur during vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Secret error: malformed, insufficient level, or a failed signature
    /// or decryption.
    #[error("secret error: {0}")]
    Secret(#[from] SecretError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Control surface error.
    #[error("control error: {0}")]
    Control(#[from] ControlError),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The folder is not registered.
    #[error("folder not found: {0}")]
    FolderNotFound(FolderId),

    /// No record exists for the file path.
    #[error("file not found in folder {0}")]
    FileNotFound(FolderId),

    /// A stored record does not match what it claims to be.
    #[error("record mismatch in folder {folder_id}: {reason}")]
    RecordMismatch { folder_id: FolderId, reason: String },

    /// A file's metadata exceeds the configured limit.
    #[error("metadata too large: {size} bytes (limit {limit})")]
    MetaTooLarge { size: usize, limit: usize },
}

impl From<VaultError> for ControlError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::Secret(e) => ControlError::Secret(e),
            VaultError::Control(e) => e,
            other => ControlError::registry(other),
        }
    }
}

/// Result type for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
