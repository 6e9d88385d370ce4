//! # Sharekey
//!
//! Shared folders where access is a string you hand out.
//!
//! ## Overview
//!
//! Each shared folder has one owner secret. Weaker secrets are derived from
//! it and given to peers; the level of the secret decides what a node can do:
//!
//! - **Owner / ReadWrite**: record files (sign their metadata)
//! - **ReadOnly**: read paths and verify records
//! - **Download**: join the folder and relay encrypted data only
//!
//! The [`Vault`] ties the secret hierarchy to a folder index and exposes the
//! JSON control surface through [`FolderRegistry`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sharekey::{PrivilegeLevel, Vault, VaultConfig};
//! use sharekey::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("index.db").unwrap();
//!     let vault = Vault::new(store, VaultConfig::default());
//!
//!     // Create a folder and record a file in it
//!     let owner = vault.create_folder("/home/me/share").await.unwrap();
//!     vault.record_file(&owner, "notes.txt", b"size=42").await.unwrap();
//!
//!     // Hand out a read-only secret
//!     let read_only = owner.derive(PrivilegeLevel::ReadOnly).unwrap();
//!     println!("share this: {}", read_only.encode());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `sharekey::core` - The secret hierarchy
//! - `sharekey::store` - Folder index storage
//! - `sharekey::control` - JSON control messages

pub mod error;
pub mod vault;

// Re-export component crates
pub use sharekey_control as control;
pub use sharekey_core as core;
pub use sharekey_store as store;

// Re-export main types for convenience
pub use error::{Result, VaultError};
pub use vault::{file_message, Vault, VaultConfig, VerifiedFile};

pub use sharekey_control::{ControlConfig, ControlEvent, ControlHandler, ControlMessage, FolderRegistry};
pub use sharekey_core::{FolderId, PathId, PrivilegeLevel, Secret, SecretError};
