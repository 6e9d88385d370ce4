//! # Sharekey Core
//!
//! The share secret hierarchy for synchronized folders.
//!
//! A folder owner generates one signing secret. From it, strictly weaker
//! secrets are derived, each unlocking less:
//!
//! | Level       | Char | Payload                          | Capability                |
//! |-------------|------|----------------------------------|---------------------------|
//! | `Owner`     | `A`  | P-256 private scalar (32 bytes)  | same as `ReadWrite`       |
//! | `ReadWrite` | `B`  | P-256 private scalar (32 bytes)  | sign file metadata        |
//! | `ReadOnly`  | `C`  | public point (33) + key (32)     | verify, decrypt content   |
//! | `Download`  | `D`  | download key (32 bytes)          | relay encrypted content   |
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over immutable values; [`Secret`] is `Send + Sync`.
//!
//! ## Text Form
//!
//! `[type char][base58 payload][check char]`, where the check char is a
//! Luhn mod 58 checksum. See [`codec`].
//!
//! ## Usage
//!
//! ```rust
//! use sharekey_core::{PrivilegeLevel, Secret};
//!
//! let owner = Secret::random(PrivilegeLevel::ReadWrite).unwrap();
//! let read_only = owner.derive(PrivilegeLevel::ReadOnly).unwrap();
//!
//! let parsed = Secret::decode(read_only.encode()).unwrap();
//! assert_eq!(parsed, read_only);
//! assert!(parsed.derive(PrivilegeLevel::ReadWrite).is_err());
//! ```

pub mod codec;
pub mod crypto;
pub mod error;
pub mod level;
pub mod secret;
pub mod types;

pub use crypto::{DownloadKey, EncryptionKey, PrivateKey, PublicKey, SecretSignature};
pub use error::{ErrorKind, Result, SecretError};
pub use level::PrivilegeLevel;
pub use secret::Secret;
pub use types::{FolderId, PathId};
