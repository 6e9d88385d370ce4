//! Error types for share secrets.

use thiserror::Error;

use crate::level::PrivilegeLevel;

/// Errors that can occur while decoding, deriving, or using a secret.
///
/// Every failing path maps to exactly one variant so callers can tell a
/// user-input problem ([`SecretError::Format`]) apart from an invariant
/// violation ([`SecretError::Level`], [`SecretError::Crypto`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretError {
    /// The encoded string is malformed.
    #[error("secret format mismatch: {0}")]
    Format(String),

    /// The held secret lacks the privilege the operation requires.
    #[error("insufficient privileges: {held} secret cannot act as {required}")]
    Level {
        held: PrivilegeLevel,
        required: PrivilegeLevel,
    },

    /// An underlying cryptographic primitive failed.
    #[error("cryptographic error: {0}")]
    Crypto(String),
}

/// Coarse classification of a [`SecretError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Format,
    Level,
    Crypto,
}

impl ErrorKind {
    /// Stable lowercase name, used in control-surface error events.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Format => "format",
            ErrorKind::Level => "level",
            ErrorKind::Crypto => "crypto",
        }
    }
}

impl SecretError {
    /// Get the kind of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            SecretError::Format(_) => ErrorKind::Format,
            SecretError::Level { .. } => ErrorKind::Level,
            SecretError::Crypto(_) => ErrorKind::Crypto,
        }
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        SecretError::Format(msg.into())
    }

    pub(crate) fn crypto(msg: impl Into<String>) -> Self {
        SecretError::Crypto(msg.into())
    }

    pub(crate) const fn level(held: PrivilegeLevel, required: PrivilegeLevel) -> Self {
        SecretError::Level { held, required }
    }
}

/// Result type for secret operations.
pub type Result<T> = std::result::Result<T, SecretError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(SecretError::format("x").kind(), ErrorKind::Format);
        assert_eq!(SecretError::crypto("x").kind(), ErrorKind::Crypto);
        assert_eq!(
            SecretError::level(PrivilegeLevel::ReadOnly, PrivilegeLevel::ReadWrite).kind(),
            ErrorKind::Level
        );
    }

    #[test]
    fn test_level_error_message() {
        let err = SecretError::level(PrivilegeLevel::Download, PrivilegeLevel::ReadOnly);
        assert_eq!(
            err.to_string(),
            "insufficient privileges: Download secret cannot act as ReadOnly"
        );
    }
}
