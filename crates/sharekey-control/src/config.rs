//! Control surface configuration.

use serde::{Deserialize, Serialize};

use sharekey_core::PrivilegeLevel;

use crate::messages::DEFAULT_MAX_MESSAGE_BYTES;

/// Minimum secret levels and limits enforced by [`ControlHandler`].
///
/// [`ControlHandler`]: crate::ControlHandler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Weakest secret accepted by `add_folder`.
    pub add_folder_min: PrivilegeLevel,
    /// Weakest secret accepted by `remove_folder`.
    pub remove_folder_min: PrivilegeLevel,
    /// Weakest secret accepted as the source of `derive_secret`.
    pub derive_secret_min: PrivilegeLevel,
    /// Largest accepted message, in bytes.
    pub max_message_bytes: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            add_folder_min: PrivilegeLevel::Download,
            remove_folder_min: PrivilegeLevel::Download,
            derive_secret_min: PrivilegeLevel::Download,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ControlConfig =
            serde_json::from_str(r#"{"add_folder_min":"read_only"}"#).unwrap();
        assert_eq!(config.add_folder_min, PrivilegeLevel::ReadOnly);
        assert_eq!(config.remove_folder_min, PrivilegeLevel::Download);
        assert_eq!(config.max_message_bytes, DEFAULT_MAX_MESSAGE_BYTES);
    }
}
