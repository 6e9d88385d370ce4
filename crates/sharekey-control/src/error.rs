//! Error types for the control module.

use thiserror::Error;

use sharekey_core::SecretError;

/// Errors that can occur while handling a control message.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The message is not valid JSON or not a known command.
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),

    /// The message exceeds the configured size limit.
    #[error("message too large: {size} bytes (limit {limit})")]
    MessageTooLarge { size: usize, limit: usize },

    /// A field failed validation.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The secret could not be decoded, lacks privileges, or failed a
    /// cryptographic check.
    #[error(transparent)]
    Secret(#[from] SecretError),

    /// The folder named by the secret is not registered.
    #[error("unknown folder: {0}")]
    UnknownFolder(String),

    /// The folder registry failed.
    #[error("registry error: {0}")]
    Registry(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ControlError {
    /// Stable kind name carried in `error` events.
    pub fn kind(&self) -> &'static str {
        match self {
            ControlError::Json(_)
            | ControlError::MessageTooLarge { .. }
            | ControlError::InvalidMessage(_) => "message",
            ControlError::Secret(e) => e.kind().as_str(),
            ControlError::UnknownFolder(_) => "unknown_folder",
            ControlError::Registry(_) => "registry",
        }
    }

    /// Wrap a registry failure.
    pub fn registry(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        ControlError::Registry(Box::new(err))
    }
}

/// Result type for control operations.
pub type Result<T> = std::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sharekey_core::{PrivilegeLevel, Secret};

    #[test]
    fn test_secret_kinds_pass_through() {
        let format = Secret::decode("nonsense").unwrap_err();
        assert_eq!(ControlError::from(format).kind(), "format");

        let level = Secret::random(PrivilegeLevel::ReadWrite)
            .unwrap()
            .derive(PrivilegeLevel::Download)
            .unwrap()
            .require(PrivilegeLevel::ReadOnly)
            .unwrap_err();
        assert_eq!(ControlError::from(level).kind(), "level");
    }

    #[test]
    fn test_json_kind() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ControlError::from(err).kind(), "message");
    }

    #[test]
    fn test_registry_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = ControlError::registry(io);
        assert_eq!(err.kind(), "registry");
        assert_eq!(err.to_string(), "registry error: disk gone");
    }
}
