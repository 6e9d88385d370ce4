//! # Sharekey Store
//!
//! Folder index persistence. Provides a trait-based interface for folder and
//! file-record storage with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The [`IndexStore`] trait keeps callers storage-agnostic. The primary
//! implementation is [`SqliteStore`], built on the small [`SqliteDb`]
//! wrapper (named parameters, typed values, savepoints). [`MemoryStore`]
//! is for tests.
//!
//! The store never sees a secret. It holds folder IDs, keyed path hashes,
//! ciphertext and signatures only.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sharekey_store::{FolderRecord, IndexStore, SqliteStore};
//! use sharekey_core::{PrivilegeLevel, Secret};
//!
//! async fn example() {
//!     let store = SqliteStore::open("index.db").unwrap();
//!     let secret = Secret::random(PrivilegeLevel::ReadWrite).unwrap();
//!
//!     let record = FolderRecord {
//!         folder_id: secret.folder_id(),
//!         path: "/home/me/share".into(),
//!         level: secret.level(),
//!         added_at: 0,
//!     };
//!     store.register_folder(&record).await.unwrap();
//! }
//! ```

pub mod db;
pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use db::{ResultSet, Row, Savepoint, SqlValue, SqliteDb};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{FileRecord, FolderRecord, IndexStore};

/// Current time in Unix milliseconds, as stored in `added_at`/`updated_at`.
pub fn now_millis() -> i64 {
    migration::now_millis()
}
