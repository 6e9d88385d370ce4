//! # Sharekey Testkit
//!
//! Testing utilities for sharekey.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Vectors**: Recorded encoded secrets with their expected decoding
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Seeded shares and a ready-made vault
//!
//! ## Vectors
//!
//! ```rust
//! use sharekey_testkit::vectors::verify_all_vectors;
//!
//! for (name, result) in verify_all_vectors() {
//!     assert!(result.is_ok(), "{}: {:?}", name, result);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use sharekey_testkit::generators::{secrets_from_params, SecretParams};
//!
//! proptest! {
//!     #[test]
//!     fn derived_secrets_share_a_folder(params: SecretParams) {
//!         let (root, derived) = secrets_from_params(&params);
//!         prop_assert_eq!(root.folder_id(), derived.folder_id());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use sharekey_testkit::fixtures::ShareSecrets;
//! use sharekey_core::PrivilegeLevel;
//!
//! let share = ShareSecrets::from_seed(7);
//! assert_eq!(share.at(PrivilegeLevel::ReadOnly).level(), PrivilegeLevel::ReadOnly);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_share_secrets, seeded_owner, ShareSecrets, TestFixture};
pub use generators::{secrets_from_params, SecretParams};
pub use vectors::{all_vectors, check_vector, verify_all_vectors, Expect, SecretVector};
