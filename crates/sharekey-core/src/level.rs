//! Privilege levels of the share secret hierarchy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of a P-256 private scalar.
pub const PRIVATE_KEY_SIZE: usize = 32;
/// Size of a compressed SEC1 P-256 point.
pub const PUBLIC_KEY_SIZE: usize = 33;
/// Size of the symmetric keys (encryption and download).
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// One of the four capability tiers a secret can hold.
///
/// Ordered strongest to weakest: `Owner`/`ReadWrite` > `ReadOnly` > `Download`.
/// `Owner` and `ReadWrite` share a tier: same payload, same capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeLevel {
    /// Reserved for managed shares. Currently equal to `ReadWrite`.
    Owner,
    /// Signing key, used to sign modified files.
    ReadWrite,
    /// Verification and content decryption.
    ReadOnly,
    /// Opaque relay of encrypted content between peers.
    Download,
}

impl PrivilegeLevel {
    /// All levels, strongest first.
    pub const ALL: [PrivilegeLevel; 4] = [
        PrivilegeLevel::Owner,
        PrivilegeLevel::ReadWrite,
        PrivilegeLevel::ReadOnly,
        PrivilegeLevel::Download,
    ];

    /// The leading character of an encoded secret at this level.
    pub const fn type_char(self) -> char {
        match self {
            PrivilegeLevel::Owner => 'A',
            PrivilegeLevel::ReadWrite => 'B',
            PrivilegeLevel::ReadOnly => 'C',
            PrivilegeLevel::Download => 'D',
        }
    }

    /// Map a type character back to its level.
    pub const fn from_type_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(PrivilegeLevel::Owner),
            'B' => Some(PrivilegeLevel::ReadWrite),
            'C' => Some(PrivilegeLevel::ReadOnly),
            'D' => Some(PrivilegeLevel::Download),
            _ => None,
        }
    }

    /// Capability tier. Higher is stronger.
    const fn tier(self) -> u8 {
        match self {
            PrivilegeLevel::Owner | PrivilegeLevel::ReadWrite => 2,
            PrivilegeLevel::ReadOnly => 1,
            PrivilegeLevel::Download => 0,
        }
    }

    /// Whether a holder of `self` has every capability of `other`.
    pub const fn covers(self, other: PrivilegeLevel) -> bool {
        self.tier() >= other.tier()
    }

    /// Whether this level carries the private signing scalar.
    pub const fn is_signing(self) -> bool {
        self.tier() == 2
    }

    /// Exact payload size in bytes for this level.
    pub const fn payload_len(self) -> usize {
        match self {
            PrivilegeLevel::Owner | PrivilegeLevel::ReadWrite => PRIVATE_KEY_SIZE,
            PrivilegeLevel::ReadOnly => PUBLIC_KEY_SIZE + SYMMETRIC_KEY_SIZE,
            PrivilegeLevel::Download => SYMMETRIC_KEY_SIZE,
        }
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            PrivilegeLevel::Owner => "Owner",
            PrivilegeLevel::ReadWrite => "ReadWrite",
            PrivilegeLevel::ReadOnly => "ReadOnly",
            PrivilegeLevel::Download => "Download",
        }
    }
}

impl fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_char_roundtrip() {
        for level in PrivilegeLevel::ALL {
            assert_eq!(PrivilegeLevel::from_type_char(level.type_char()), Some(level));
        }
        assert_eq!(PrivilegeLevel::from_type_char('Z'), None);
        assert_eq!(PrivilegeLevel::from_type_char('a'), None);
    }

    #[test]
    fn test_ordering() {
        use PrivilegeLevel::*;

        assert!(Owner.covers(ReadWrite));
        assert!(ReadWrite.covers(Owner));
        assert!(ReadWrite.covers(ReadOnly));
        assert!(ReadOnly.covers(Download));
        assert!(Download.covers(Download));

        assert!(!ReadOnly.covers(ReadWrite));
        assert!(!ReadOnly.covers(Owner));
        assert!(!Download.covers(ReadOnly));
    }

    #[test]
    fn test_payload_sizes() {
        assert_eq!(PrivilegeLevel::Owner.payload_len(), 32);
        assert_eq!(PrivilegeLevel::ReadWrite.payload_len(), 32);
        assert_eq!(PrivilegeLevel::ReadOnly.payload_len(), 65);
        assert_eq!(PrivilegeLevel::Download.payload_len(), 32);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&PrivilegeLevel::ReadOnly).unwrap();
        assert_eq!(json, "\"read_only\"");

        let level: PrivilegeLevel = serde_json::from_str("\"read_write\"").unwrap();
        assert_eq!(level, PrivilegeLevel::ReadWrite);
    }
}
