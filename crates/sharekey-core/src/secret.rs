//! The share secret: one privilege level's key material plus its text form.
//!
//! A [`Secret`] never changes after construction. Weaker secrets are made
//! with [`Secret::derive`], which returns a new value; there is no path from
//! a weaker secret back to a stronger one.
//!
//! ```text
//!  Owner / ReadWrite      ReadOnly                    Download
//!  private scalar d  -->  P = d·G                -->  BLAKE3(download ctx, P)
//!                         BLAKE3(encryption ctx, P)
//! ```

use rand::{CryptoRng, RngCore};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::codec;
use crate::crypto::{DownloadKey, EncryptionKey, PrivateKey, PublicKey, SecretSignature};
use crate::error::{Result, SecretError};
use crate::level::{PrivilegeLevel, PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE, SYMMETRIC_KEY_SIZE};
use crate::types::{FolderId, PathId};

/// Key material held at each tier.
#[derive(Clone, PartialEq, Eq)]
enum Material {
    Signing(PrivateKey),
    ReadOnly {
        public: PublicKey,
        encryption: EncryptionKey,
    },
    Download(DownloadKey),
}

impl Material {
    fn to_payload(&self) -> Zeroizing<Vec<u8>> {
        match self {
            Material::Signing(private) => Zeroizing::new(private.to_bytes().to_vec()),
            Material::ReadOnly { public, encryption } => {
                let mut payload =
                    Zeroizing::new(Vec::with_capacity(PUBLIC_KEY_SIZE + SYMMETRIC_KEY_SIZE));
                payload.extend_from_slice(&public.to_bytes());
                payload.extend_from_slice(encryption.as_bytes());
                payload
            }
            Material::Download(download) => Zeroizing::new(download.as_bytes().to_vec()),
        }
    }

    /// Interpret a payload whose length already matches `level`.
    fn from_payload(level: PrivilegeLevel, payload: &[u8]) -> Result<Self> {
        let length_error = || {
            SecretError::format(format!(
                "invalid {} payload length: expected {}, got {}",
                level,
                level.payload_len(),
                payload.len()
            ))
        };

        match level {
            PrivilegeLevel::Owner | PrivilegeLevel::ReadWrite => {
                let bytes: [u8; PRIVATE_KEY_SIZE] =
                    payload.try_into().map_err(|_| length_error())?;
                Ok(Material::Signing(PrivateKey::from_bytes(&bytes)?))
            }
            PrivilegeLevel::ReadOnly => {
                if payload.len() != PUBLIC_KEY_SIZE + SYMMETRIC_KEY_SIZE {
                    return Err(length_error());
                }
                let (point, key) = payload.split_at(PUBLIC_KEY_SIZE);
                let point: [u8; PUBLIC_KEY_SIZE] = point.try_into().map_err(|_| length_error())?;
                let key: [u8; SYMMETRIC_KEY_SIZE] = key.try_into().map_err(|_| length_error())?;
                let public = PublicKey::from_bytes(&point)?;
                let encryption = EncryptionKey::derive(&public);
                if encryption.as_bytes() != &key {
                    return Err(SecretError::crypto(
                        "encryption key does not match the public point",
                    ));
                }
                Ok(Material::ReadOnly { public, encryption })
            }
            PrivilegeLevel::Download => {
                let key: [u8; SYMMETRIC_KEY_SIZE] =
                    payload.try_into().map_err(|_| length_error())?;
                Ok(Material::Download(DownloadKey::from_bytes(key)))
            }
        }
    }
}

/// A share secret at one privilege level.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    level: PrivilegeLevel,
    material: Material,
    /// `[type char][base58 payload][check char]`, computed once.
    encoded: Zeroizing<String>,
}

impl Secret {
    fn from_material(level: PrivilegeLevel, material: Material) -> Self {
        let encoded = Zeroizing::new(codec::encode(level, &material.to_payload()));
        Self {
            level,
            material,
            encoded,
        }
    }

    /// Generate a fresh signing secret, drawing the scalar from `rng`.
    ///
    /// Only `Owner` and `ReadWrite` can be generated; weaker levels must be
    /// derived from a generated secret.
    pub fn generate<R: RngCore + CryptoRng>(level: PrivilegeLevel, rng: &mut R) -> Result<Self> {
        if !level.is_signing() {
            return Err(SecretError::level(level, PrivilegeLevel::ReadWrite));
        }
        let private = PrivateKey::generate(rng)?;
        Ok(Self::from_material(level, Material::Signing(private)))
    }

    /// Generate a fresh signing secret from the operating system's RNG.
    pub fn random(level: PrivilegeLevel) -> Result<Self> {
        Self::generate(level, &mut rand::rngs::OsRng)
    }

    /// Parse and validate an encoded secret.
    ///
    /// Structural problems (length, type char, check char, alphabet, payload
    /// size) are [`SecretError::Format`]; key material that is off the curve
    /// or outside the scalar domain is [`SecretError::Crypto`].
    pub fn decode(text: &str) -> Result<Self> {
        let (level, payload) = codec::decode(text)?;
        let payload = Zeroizing::new(payload);
        let material = Material::from_payload(level, &payload)?;
        Ok(Self::from_material(level, material))
    }

    /// The encoded text form.
    pub fn encode(&self) -> &str {
        &self.encoded
    }

    /// The privilege level held.
    pub const fn level(&self) -> PrivilegeLevel {
        self.level
    }

    /// The leading type character.
    pub const fn type_char(&self) -> char {
        self.level.type_char()
    }

    /// The trailing check character.
    pub fn check_char(&self) -> char {
        // The encoded form always ends in a check character.
        self.encoded.chars().last().unwrap_or_default()
    }

    /// The raw payload bytes for this level.
    pub fn payload(&self) -> Vec<u8> {
        self.material.to_payload().to_vec()
    }

    /// Fail with [`SecretError::Level`] unless this secret covers `required`.
    pub fn require(&self, required: PrivilegeLevel) -> Result<()> {
        if self.level.covers(required) {
            Ok(())
        } else {
            Err(SecretError::level(self.level, required))
        }
    }

    /// Derive a secret at `target`, which must not be stronger than `self`.
    ///
    /// The privilege check runs before any cryptographic work. Deriving the
    /// held level returns an equal copy.
    pub fn derive(&self, target: PrivilegeLevel) -> Result<Secret> {
        self.require(target)?;
        if target == self.level {
            return Ok(self.clone());
        }

        let material = match target {
            // Same tier as self: only the label changes.
            PrivilegeLevel::Owner | PrivilegeLevel::ReadWrite => self.material.clone(),
            PrivilegeLevel::ReadOnly => {
                let public = self.public_key()?;
                Material::ReadOnly {
                    encryption: EncryptionKey::derive(&public),
                    public,
                }
            }
            PrivilegeLevel::Download => Material::Download(self.download_key()),
        };

        Ok(Self::from_material(target, material))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payload accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// The private signing scalar. Requires `ReadWrite`.
    pub fn private_key(&self) -> Result<&PrivateKey> {
        match &self.material {
            Material::Signing(private) => Ok(private),
            _ => Err(SecretError::level(self.level, PrivilegeLevel::ReadWrite)),
        }
    }

    /// The public point. Requires `ReadOnly`.
    pub fn public_key(&self) -> Result<PublicKey> {
        match &self.material {
            Material::Signing(private) => Ok(private.public_key()),
            Material::ReadOnly { public, .. } => Ok(public.clone()),
            Material::Download(_) => Err(SecretError::level(self.level, PrivilegeLevel::ReadOnly)),
        }
    }

    /// The content encryption key. Requires `ReadOnly`.
    pub fn encryption_key(&self) -> Result<EncryptionKey> {
        match &self.material {
            Material::Signing(private) => Ok(EncryptionKey::derive(&private.public_key())),
            Material::ReadOnly { encryption, .. } => Ok(encryption.clone()),
            Material::Download(_) => Err(SecretError::level(self.level, PrivilegeLevel::ReadOnly)),
        }
    }

    /// The transfer key. Every level holds or can derive it.
    pub fn download_key(&self) -> DownloadKey {
        match &self.material {
            Material::Signing(private) => DownloadKey::derive(&private.public_key()),
            Material::ReadOnly { public, .. } => DownloadKey::derive(public),
            Material::Download(download) => download.clone(),
        }
    }

    /// The folder this secret belongs to. Identical for every level of a share.
    pub fn folder_id(&self) -> FolderId {
        self.download_key().folder_id()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Capability operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Sign a message. Requires `ReadWrite`.
    pub fn sign(&self, message: &[u8]) -> Result<SecretSignature> {
        Ok(self.private_key()?.sign(message))
    }

    /// Verify a signature made by this share's signing key. Requires `ReadOnly`.
    pub fn verify(&self, message: &[u8], signature: &SecretSignature) -> Result<()> {
        self.public_key()?.verify(message, signature)
    }

    /// Encrypt content for the share, drawing the nonce from `rng`. Requires
    /// `ReadOnly`.
    pub fn encrypt<R: RngCore + CryptoRng>(
        &self,
        plaintext: &[u8],
        rng: &mut R,
    ) -> Result<Vec<u8>> {
        self.encryption_key()?.encrypt(plaintext, rng)
    }

    /// Decrypt content of the share. Requires `ReadOnly`.
    pub fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        self.encryption_key()?.decrypt(sealed)
    }

    /// Keyed identifier of a file path. Requires `ReadOnly`.
    pub fn path_id(&self, path: &str) -> Result<PathId> {
        Ok(self.encryption_key()?.path_id(path))
    }
}

impl FromStr for Secret {
    type Err = SecretError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("level", &self.level)
            .field("folder_id", &self.folder_id())
            .finish_non_exhaustive()
    }
}
