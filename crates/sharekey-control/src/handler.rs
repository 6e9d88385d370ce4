//! Command dispatch.
//!
//! [`ControlHandler`] turns one JSON command into one JSON event. It owns the
//! policy (size limit, minimum secret level per command) and leaves folder
//! bookkeeping to a [`FolderRegistry`].

use async_trait::async_trait;

use sharekey_core::{FolderId, Secret};

use crate::config::ControlConfig;
use crate::error::{ControlError, Result};
use crate::messages::{ControlEvent, ControlMessage};

/// Where folders joined through the control surface are kept.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait FolderRegistry: Send + Sync {
    /// Join the folder `secret` belongs to, synchronizing into `path`.
    ///
    /// Returns the folder's ID.
    async fn add_folder(&self, secret: &Secret, path: &str) -> Result<FolderId>;

    /// Leave a folder. Returns `false` if it was not joined.
    async fn remove_folder(&self, folder_id: &FolderId) -> Result<bool>;
}

#[async_trait]
impl<T: FolderRegistry + ?Sized> FolderRegistry for std::sync::Arc<T> {
    async fn add_folder(&self, secret: &Secret, path: &str) -> Result<FolderId> {
        (**self).add_folder(secret, path).await
    }

    async fn remove_folder(&self, folder_id: &FolderId) -> Result<bool> {
        (**self).remove_folder(folder_id).await
    }
}

/// Parses, authorizes and dispatches control commands.
pub struct ControlHandler<R: FolderRegistry> {
    registry: R,
    config: ControlConfig,
}

impl<R: FolderRegistry> ControlHandler<R> {
    /// Create a handler over `registry`.
    pub fn new(registry: R, config: ControlConfig) -> Self {
        Self { registry, config }
    }

    /// Get a reference to the registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Get the configuration.
    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Parse one command, enforcing the size limit.
    pub fn parse(&self, text: &str) -> Result<ControlMessage> {
        if text.len() > self.config.max_message_bytes {
            return Err(ControlError::MessageTooLarge {
                size: text.len(),
                limit: self.config.max_message_bytes,
            });
        }
        Ok(serde_json::from_str(text)?)
    }

    /// Handle one JSON command and produce the JSON answer.
    ///
    /// Failures are answered with an `error` event; only encoding the answer
    /// itself can fail.
    pub async fn handle_json(&self, text: &str) -> Result<String> {
        let event = match self.parse(text) {
            Ok(message) => self.handle(message).await,
            Err(e) => {
                tracing::warn!(kind = e.kind(), "rejected control message");
                ControlEvent::error(&e)
            }
        };
        event.to_json()
    }

    /// Handle one parsed command.
    pub async fn handle(&self, message: ControlMessage) -> ControlEvent {
        let command = message.command();
        match self.dispatch(message).await {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(command, kind = e.kind(), "control command failed");
                ControlEvent::error(&e)
            }
        }
    }

    async fn dispatch(&self, message: ControlMessage) -> Result<ControlEvent> {
        match message {
            ControlMessage::AddFolder { secret, path } => {
                let secret = Secret::decode(&secret)?;
                secret.require(self.config.add_folder_min)?;
                if path.trim().is_empty() {
                    return Err(ControlError::InvalidMessage("path must not be empty".into()));
                }

                let folder_id = self.registry.add_folder(&secret, &path).await?;
                tracing::info!(folder = %folder_id, level = %secret.level(), "folder added");
                Ok(ControlEvent::folder_added(&folder_id, path, secret.level()))
            }

            ControlMessage::RemoveFolder { secret } => {
                let secret = Secret::decode(&secret)?;
                secret.require(self.config.remove_folder_min)?;

                let folder_id = secret.folder_id();
                if !self.registry.remove_folder(&folder_id).await? {
                    return Err(ControlError::UnknownFolder(folder_id.to_hex()));
                }
                tracing::info!(folder = %folder_id, "folder removed");
                Ok(ControlEvent::folder_removed(&folder_id))
            }

            ControlMessage::DeriveSecret { secret, level } => {
                let secret = Secret::decode(&secret)?;
                secret.require(self.config.derive_secret_min)?;

                let derived = secret.derive(level)?;
                tracing::debug!(folder = %derived.folder_id(), %level, "secret derived");
                Ok(ControlEvent::SecretDerived {
                    level,
                    secret: derived.encode().to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharekey_core::PrivilegeLevel;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Registry that remembers folders in a map.
    #[derive(Default)]
    struct MapRegistry {
        folders: Mutex<HashMap<FolderId, String>>,
    }

    #[async_trait]
    impl FolderRegistry for MapRegistry {
        async fn add_folder(&self, secret: &Secret, path: &str) -> Result<FolderId> {
            let id = secret.folder_id();
            self.folders.lock().unwrap().insert(id, path.to_string());
            Ok(id)
        }

        async fn remove_folder(&self, folder_id: &FolderId) -> Result<bool> {
            Ok(self.folders.lock().unwrap().remove(folder_id).is_some())
        }
    }

    fn handler(config: ControlConfig) -> ControlHandler<MapRegistry> {
        ControlHandler::new(MapRegistry::default(), config)
    }

    fn kind_of(event: &ControlEvent) -> &str {
        match event {
            ControlEvent::Error { kind, .. } => kind.as_str(),
            _ => panic!("expected an error event, got {:?}", event),
        }
    }

    #[tokio::test]
    async fn test_add_then_remove_with_download_secret() {
        let h = handler(ControlConfig::default());
        let owner = Secret::random(PrivilegeLevel::ReadWrite).unwrap();
        let download = owner.derive(PrivilegeLevel::Download).unwrap();

        let added = h
            .handle(ControlMessage::AddFolder {
                secret: download.encode().to_string(),
                path: "/srv/share".into(),
            })
            .await;
        assert_eq!(
            added,
            ControlEvent::folder_added(&owner.folder_id(), "/srv/share", PrivilegeLevel::Download)
        );

        // Any secret of the share names the same folder.
        let removed = h
            .handle(ControlMessage::RemoveFolder {
                secret: owner.encode().to_string(),
            })
            .await;
        assert_eq!(removed, ControlEvent::folder_removed(&owner.folder_id()));
        assert!(h.registry().folders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_minimum_level_enforced() {
        let h = handler(ControlConfig {
            add_folder_min: PrivilegeLevel::ReadOnly,
            ..ControlConfig::default()
        });
        let download = Secret::random(PrivilegeLevel::ReadWrite)
            .unwrap()
            .derive(PrivilegeLevel::Download)
            .unwrap();

        let event = h
            .handle(ControlMessage::AddFolder {
                secret: download.encode().to_string(),
                path: "/srv/share".into(),
            })
            .await;
        assert_eq!(kind_of(&event), "level");
        assert!(h.registry().folders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_secret_is_format_error() {
        let h = handler(ControlConfig::default());
        let json = h
            .handle_json(r#"{"command":"add_folder","secret":"B1111","path":"/x"}"#)
            .await
            .unwrap();
        let event: ControlEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(kind_of(&event), "format");
    }

    #[tokio::test]
    async fn test_remove_unknown_folder() {
        let h = handler(ControlConfig::default());
        let secret = Secret::random(PrivilegeLevel::Owner).unwrap();
        let event = h
            .handle(ControlMessage::RemoveFolder {
                secret: secret.encode().to_string(),
            })
            .await;
        assert_eq!(kind_of(&event), "unknown_folder");
    }

    #[tokio::test]
    async fn test_derive_secret_round_trip() {
        let h = handler(ControlConfig::default());
        let owner = Secret::random(PrivilegeLevel::ReadWrite).unwrap();

        let event = h
            .handle(ControlMessage::DeriveSecret {
                secret: owner.encode().to_string(),
                level: PrivilegeLevel::ReadOnly,
            })
            .await;
        let ControlEvent::SecretDerived { level, secret } = event else {
            panic!("expected secret_derived");
        };
        assert_eq!(level, PrivilegeLevel::ReadOnly);
        assert_eq!(Secret::decode(&secret).unwrap(), owner.derive(level).unwrap());
    }

    #[tokio::test]
    async fn test_derive_upward_is_level_error() {
        let h = handler(ControlConfig::default());
        let read_only = Secret::random(PrivilegeLevel::ReadWrite)
            .unwrap()
            .derive(PrivilegeLevel::ReadOnly)
            .unwrap();

        let event = h
            .handle(ControlMessage::DeriveSecret {
                secret: read_only.encode().to_string(),
                level: PrivilegeLevel::ReadWrite,
            })
            .await;
        assert_eq!(kind_of(&event), "level");
    }

    #[tokio::test]
    async fn test_oversized_and_invalid_json() {
        let h = handler(ControlConfig {
            max_message_bytes: 32,
            ..ControlConfig::default()
        });

        let long = format!(r#"{{"command":"remove_folder","secret":"{}"}}"#, "1".repeat(64));
        let event: ControlEvent =
            serde_json::from_str(&h.handle_json(&long).await.unwrap()).unwrap();
        assert_eq!(kind_of(&event), "message");

        let event: ControlEvent =
            serde_json::from_str(&h.handle_json("not json").await.unwrap()).unwrap();
        assert_eq!(kind_of(&event), "message");
    }

    #[tokio::test]
    async fn test_empty_path_rejected() {
        let h = handler(ControlConfig::default());
        let secret = Secret::random(PrivilegeLevel::ReadWrite).unwrap();
        let event = h
            .handle(ControlMessage::AddFolder {
                secret: secret.encode().to_string(),
                path: "  ".into(),
            })
            .await;
        assert_eq!(kind_of(&event), "message");
    }
}
