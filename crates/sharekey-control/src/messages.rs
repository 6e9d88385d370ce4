//! Control message types.
//!
//! Commands arrive as JSON objects tagged by `"command"`; every command is
//! answered with one event tagged by `"event"`.
//!
//! ```text
//! {"command":"add_folder","secret":"C...","path":"/home/me/photos"}
//! {"event":"folder_added","folder_id":"9f2c...","path":"/home/me/photos","level":"read_only"}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use sharekey_core::{FolderId, PrivilegeLevel};

use crate::error::ControlError;

/// Default size limit for one control message.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 16 * 1024;

/// Commands accepted by the control surface.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Join a folder with the given secret, synchronizing into `path`.
    AddFolder {
        /// Encoded secret of any level.
        secret: String,
        /// Local directory.
        path: String,
    },

    /// Leave the folder the secret belongs to.
    RemoveFolder {
        /// Encoded secret of any level of the folder's share.
        secret: String,
    },

    /// Derive a weaker secret for sharing.
    DeriveSecret {
        /// Encoded source secret.
        secret: String,
        /// Level of the secret to produce.
        level: PrivilegeLevel,
    },
}

impl ControlMessage {
    /// The command name as it appears on the wire.
    pub const fn command(&self) -> &'static str {
        match self {
            ControlMessage::AddFolder { .. } => "add_folder",
            ControlMessage::RemoveFolder { .. } => "remove_folder",
            ControlMessage::DeriveSecret { .. } => "derive_secret",
        }
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, ControlError> {
        Ok(serde_json::to_string(self)?)
    }
}

// Secrets never reach logs through Debug.
impl fmt::Debug for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMessage::AddFolder { path, .. } => f
                .debug_struct("AddFolder")
                .field("path", path)
                .finish_non_exhaustive(),
            ControlMessage::RemoveFolder { .. } => {
                f.debug_struct("RemoveFolder").finish_non_exhaustive()
            }
            ControlMessage::DeriveSecret { level, .. } => f
                .debug_struct("DeriveSecret")
                .field("level", level)
                .finish_non_exhaustive(),
        }
    }
}

/// Events emitted in answer to a command.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControlEvent {
    /// A folder was joined.
    FolderAdded {
        /// Hex folder ID.
        folder_id: String,
        /// Local directory.
        path: String,
        /// Level the folder was joined at.
        level: PrivilegeLevel,
    },

    /// A folder was left.
    FolderRemoved {
        /// Hex folder ID.
        folder_id: String,
    },

    /// A weaker secret was derived.
    SecretDerived {
        /// Level of the derived secret.
        level: PrivilegeLevel,
        /// The derived secret, encoded.
        secret: String,
    },

    /// The command failed.
    Error {
        /// Stable error class: `format`, `level`, `crypto`, `message`,
        /// `unknown_folder` or `registry`.
        kind: String,
        /// Human-readable description.
        message: String,
    },
}

impl ControlEvent {
    /// Build a `folder_added` event.
    pub fn folder_added(folder_id: &FolderId, path: impl Into<String>, level: PrivilegeLevel) -> Self {
        ControlEvent::FolderAdded {
            folder_id: folder_id.to_hex(),
            path: path.into(),
            level,
        }
    }

    /// Build a `folder_removed` event.
    pub fn folder_removed(folder_id: &FolderId) -> Self {
        ControlEvent::FolderRemoved {
            folder_id: folder_id.to_hex(),
        }
    }

    /// Build an `error` event from a failure.
    pub fn error(err: &ControlError) -> Self {
        ControlEvent::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }

    /// Whether this is an `error` event.
    pub fn is_error(&self) -> bool {
        matches!(self, ControlEvent::Error { .. })
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, ControlError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Debug for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlEvent::FolderAdded {
                folder_id,
                path,
                level,
            } => f
                .debug_struct("FolderAdded")
                .field("folder_id", folder_id)
                .field("path", path)
                .field("level", level)
                .finish(),
            ControlEvent::FolderRemoved { folder_id } => f
                .debug_struct("FolderRemoved")
                .field("folder_id", folder_id)
                .finish(),
            ControlEvent::SecretDerived { level, .. } => f
                .debug_struct("SecretDerived")
                .field("level", level)
                .finish_non_exhaustive(),
            ControlEvent::Error { kind, message } => f
                .debug_struct("Error")
                .field("kind", kind)
                .field("message", message)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_folder() {
        let msg: ControlMessage =
            serde_json::from_str(r#"{"command":"add_folder","secret":"Dxyz","path":"/data"}"#)
                .unwrap();
        assert_eq!(
            msg,
            ControlMessage::AddFolder {
                secret: "Dxyz".into(),
                path: "/data".into()
            }
        );
        assert_eq!(msg.command(), "add_folder");
    }

    #[test]
    fn test_parse_derive_secret_level_name() {
        let msg: ControlMessage =
            serde_json::from_str(r#"{"command":"derive_secret","secret":"B1","level":"read_only"}"#)
                .unwrap();
        assert!(matches!(
            msg,
            ControlMessage::DeriveSecret {
                level: PrivilegeLevel::ReadOnly,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(serde_json::from_str::<ControlMessage>(r#"{"command":"format_disk"}"#).is_err());
        assert!(serde_json::from_str::<ControlMessage>(r#"{"command":"remove_folder"}"#).is_err());
    }

    #[test]
    fn test_event_wire_form() {
        let event = ControlEvent::folder_removed(&FolderId::from_bytes([0xab; 32]));
        let json: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["event"], "folder_removed");
        assert_eq!(json["folder_id"], "ab".repeat(32));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let msg = ControlMessage::RemoveFolder {
            secret: "B11111111111111111111111111111112d".into(),
        };
        assert!(!format!("{:?}", msg).contains("B111"));

        let event = ControlEvent::SecretDerived {
            level: PrivilegeLevel::Download,
            secret: "DUS517G5965aydkZ46HS38QLi7UQiSojurfbQfKCELFxV".into(),
        };
        assert!(!format!("{:?}", event).contains("DUS5"));
    }
}
