//! Recorded secret vectors.
//!
//! Each vector is an encoded secret together with what decoding it must
//! produce. The valid ones pin the text layout (base58 alphabet, Luhn mod 58
//! check char) and the P-256 point encoding; the invalid ones pin which
//! error kind each kind of damage maps to.

use sharekey_core::{ErrorKind, PrivilegeLevel, Secret};

/// Expected outcome of decoding a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Decodes at this level, with this payload (hex).
    Valid {
        level: PrivilegeLevel,
        payload: &'static str,
    },
    /// Fails with this error kind.
    Invalid(ErrorKind),
}

/// A recorded secret vector.
#[derive(Debug, Clone)]
pub struct SecretVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// The encoded secret.
    pub encoded: &'static str,
    /// What decoding must produce.
    pub expect: Expect,
}

/// Private scalar 1.
pub const READ_WRITE_ONE: &str = "B11111111111111111111111111111112d";
/// Private scalar 1, owner label.
pub const OWNER_ONE: &str = "A11111111111111111111111111111112f";
/// Private scalar 1 derived to `ReadOnly`: the P-256 generator and its
/// encryption key.
pub const READ_ONLY_GENERATOR: &str =
    "CJVmFZNDPtWZyNbCbdJQ3U5dMUbcSrLZyMReEXK89zHoGoMCjukXpCgoKfDrywo3Wc6xwCqc8eqQUTwDWCa65Ga66N";
/// Download key of 0x07 bytes.
pub const DOWNLOAD_SEVENS: &str = "DUS517G5965aydkZ46HS38QLi7UQiSojurfbQfKCELFxV";

/// Compressed encoding of the P-256 generator.
pub const GENERATOR_HEX: &str = "036b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296";

/// Get all recorded vectors.
pub fn all_vectors() -> Vec<SecretVector> {
    vec![
        SecretVector {
            name: "read-write scalar one",
            encoded: READ_WRITE_ONE,
            expect: Expect::Valid {
                level: PrivilegeLevel::ReadWrite,
                payload: "0000000000000000000000000000000000000000000000000000000000000001",
            },
        },
        SecretVector {
            name: "owner scalar one",
            encoded: OWNER_ONE,
            expect: Expect::Valid {
                level: PrivilegeLevel::Owner,
                payload: "0000000000000000000000000000000000000000000000000000000000000001",
            },
        },
        SecretVector {
            name: "read-only generator point",
            encoded: READ_ONLY_GENERATOR,
            expect: Expect::Valid {
                level: PrivilegeLevel::ReadOnly,
                payload: "036b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296\
                          b1826cb695790b59fa5a23e53cfbfb67a90f298df6a7b9ba6ec1891ab49d8a43",
            },
        },
        SecretVector {
            name: "download sevens",
            encoded: DOWNLOAD_SEVENS,
            expect: Expect::Valid {
                level: PrivilegeLevel::Download,
                payload: "0707070707070707070707070707070707070707070707070707070707070707",
            },
        },
        SecretVector {
            name: "zero scalar",
            encoded: "B11111111111111111111111111111111f",
            expect: Expect::Invalid(ErrorKind::Crypto),
        },
        SecretVector {
            name: "scalar equal to the group order",
            encoded: "BJEKNVk7tHvvPBp6uLYc28iMiucFLcifaKLgq3Lrwu2QQS",
            expect: Expect::Invalid(ErrorKind::Crypto),
        },
        SecretVector {
            name: "encryption key not derived from the point",
            encoded: "CJVmFZNDPtWZyNbCbdJQ3U5dMUbcSrLZyMReEXK89zHoGfrvjjWifZEXB5E9Z4BJ1T6mWCnxWiZFA9W1yza2HDbAqq",
            expect: Expect::Invalid(ErrorKind::Crypto),
        },
        SecretVector {
            name: "x coordinate outside the field",
            encoded: "CGMaUozciJDdnUNwogZycUCLuMAmT4QG2Py12on1zE2SYBEmB4hJPuj4Xdvj2qgCkU1UL83wVBcEanvCufChJCcSda",
            expect: Expect::Invalid(ErrorKind::Crypto),
        },
        SecretVector {
            name: "empty",
            encoded: "",
            expect: Expect::Invalid(ErrorKind::Format),
        },
        SecretVector {
            name: "type char only",
            encoded: "B",
            expect: Expect::Invalid(ErrorKind::Format),
        },
        SecretVector {
            name: "unknown type char",
            encoded: "Z11111111111111111111111111111112d",
            expect: Expect::Invalid(ErrorKind::Format),
        },
        SecretVector {
            name: "wrong check char",
            encoded: "B11111111111111111111111111111112e",
            expect: Expect::Invalid(ErrorKind::Format),
        },
        SecretVector {
            name: "lowercase type char",
            encoded: "b11111111111111111111111111111112d",
            expect: Expect::Invalid(ErrorKind::Format),
        },
        SecretVector {
            name: "character outside the alphabet",
            encoded: "B1111111111111111111111111111111Od",
            expect: Expect::Invalid(ErrorKind::Format),
        },
    ]
}

/// Check one vector. Returns a description of the mismatch, if any.
pub fn check_vector(vector: &SecretVector) -> Result<(), String> {
    match (Secret::decode(vector.encoded), vector.expect) {
        (Ok(secret), Expect::Valid { level, payload }) => {
            if secret.level() != level {
                return Err(format!("level {} != {}", secret.level(), level));
            }
            let got = hex::encode(secret.payload());
            if got != payload {
                return Err(format!("payload {} != {}", got, payload));
            }
            if secret.encode() != vector.encoded {
                return Err(format!("re-encoded as {}", secret.encode()));
            }
            Ok(())
        }
        (Err(e), Expect::Invalid(kind)) if e.kind() == kind => Ok(()),
        (Ok(secret), Expect::Invalid(kind)) => {
            Err(format!("decoded as {} but expected {:?}", secret.level(), kind))
        }
        (Err(e), expect) => Err(format!("failed with {} but expected {:?}", e, expect)),
    }
}

/// Check all vectors, returning `(name, result)` pairs.
pub fn verify_all_vectors() -> Vec<(&'static str, Result<(), String>)> {
    all_vectors()
        .iter()
        .map(|v| (v.name, check_vector(v)))
        .collect()
}
