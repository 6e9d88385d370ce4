//! # Sharekey Control
//!
//! JSON control surface for joining and leaving shared folders.
//!
//! A local client (GUI, CLI) sends one command per message and receives one
//! event in answer. Secrets travel in their encoded text form; the handler
//! decodes them, checks the configured minimum level for the command, and
//! hands the decoded [`Secret`](sharekey_core::Secret) to a
//! [`FolderRegistry`].
//!
//! ## Commands
//!
//! | Command         | Fields             | Answer           |
//! |-----------------|--------------------|------------------|
//! | `add_folder`    | `secret`, `path`   | `folder_added`   |
//! | `remove_folder` | `secret`           | `folder_removed` |
//! | `derive_secret` | `secret`, `level`  | `secret_derived` |
//!
//! Any failure is answered with `{"event":"error","kind":..,"message":..}`.
//! Malformed secrets have kind `format`, secrets below the required level
//! have kind `level`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sharekey_control::{ControlConfig, ControlHandler, FolderRegistry};
//!
//! async fn serve<R: FolderRegistry>(registry: R, line: &str) -> String {
//!     let handler = ControlHandler::new(registry, ControlConfig::default());
//!     handler.handle_json(line).await.unwrap()
//! }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod messages;

pub use config::ControlConfig;
pub use error::{ControlError, Result};
pub use handler::{ControlHandler, FolderRegistry};
pub use messages::{ControlEvent, ControlMessage, DEFAULT_MAX_MESSAGE_BYTES};
