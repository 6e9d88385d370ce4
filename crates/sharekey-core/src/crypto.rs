//! Cryptographic primitives behind the secret hierarchy.
//!
//! Wraps P-256 keys and ECDSA, BLAKE3 key derivation and ChaCha20-Poly1305
//! with strong types. Nothing here knows about privilege levels; the
//! capability boundary lives in [`crate::secret`].

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use p256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::FieldBytes;
use rand::{CryptoRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Result, SecretError};
use crate::level::{PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE, SYMMETRIC_KEY_SIZE};
use crate::types::{FolderId, PathId};

/// BLAKE3 context for the ReadOnly content encryption key.
pub const ENCRYPTION_KEY_CONTEXT: &str = "sharekey 2024 read-only encryption key";
/// BLAKE3 context for the Download transfer key.
pub const DOWNLOAD_KEY_CONTEXT: &str = "sharekey 2024 download key";
/// BLAKE3 context for the folder identifier.
pub const FOLDER_ID_CONTEXT: &str = "sharekey 2024 folder id";

/// Size of a ChaCha20-Poly1305 nonce.
pub const NONCE_SIZE: usize = 12;

/// Redraws allowed before a random source is declared broken.
const MAX_SCALAR_ATTEMPTS: usize = 64;

/// A P-256 private scalar.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(p256::SecretKey);

impl PrivateKey {
    /// Draw a fresh scalar from `rng`.
    ///
    /// Out-of-domain draws (zero, or not below the group order) are redrawn.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let mut bytes = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        for _ in 0..MAX_SCALAR_ATTEMPTS {
            rng.try_fill_bytes(bytes.as_mut_slice())
                .map_err(|e| SecretError::crypto(format!("random source failed: {}", e)))?;
            if let Ok(key) = Self::from_bytes(&bytes) {
                return Ok(key);
            }
        }
        Err(SecretError::crypto("random source produced no valid scalar"))
    }

    /// Parse a big-endian scalar. Must be non-zero and below the group order.
    pub fn from_bytes(bytes: &[u8; PRIVATE_KEY_SIZE]) -> Result<Self> {
        p256::SecretKey::from_bytes(FieldBytes::from_slice(bytes))
            .map(Self)
            .map_err(|_| SecretError::crypto("private key is outside the P-256 scalar domain"))
    }

    /// Get the big-endian scalar bytes.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_SIZE] {
        let mut out = [0u8; PRIVATE_KEY_SIZE];
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    /// Compute the public point (scalar multiplication by the base point).
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.public_key())
    }

    /// Sign a message with ECDSA over SHA-256 (deterministic nonces).
    pub fn sign(&self, message: &[u8]) -> SecretSignature {
        let signing_key = SigningKey::from(&self.0);
        let signature: Signature = signing_key.sign(message);
        let mut out = [0u8; 64];
        out.copy_from_slice(&signature.to_bytes());
        SecretSignature(out)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({:?})", self.public_key())
    }
}

/// A P-256 public point.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(p256::PublicKey);

impl PublicKey {
    /// Parse a compressed SEC1 point. Fails if it is not on the curve.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_SIZE]) -> Result<Self> {
        if !matches!(bytes[0], 0x02 | 0x03) {
            return Err(SecretError::crypto(format!(
                "public key has invalid SEC1 tag {:#04x}",
                bytes[0]
            )));
        }
        p256::PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| SecretError::crypto("public key is not a point on P-256"))
    }

    /// Canonical compressed encoding.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        let mut out = [0u8; PUBLIC_KEY_SIZE];
        out.copy_from_slice(self.0.to_encoded_point(true).as_bytes());
        out
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Verify an ECDSA signature over a message.
    pub fn verify(&self, message: &[u8], signature: &SecretSignature) -> Result<()> {
        let sig = Signature::from_slice(&signature.0)
            .map_err(|_| SecretError::crypto("malformed signature"))?;
        VerifyingKey::from(&self.0)
            .verify(message, &sig)
            .map_err(|_| SecretError::crypto("signature verification failed"))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

/// A 64-byte ECDSA signature (`r || s`).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SecretSignature(pub [u8; 64]);

impl SecretSignature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a byte slice.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 64] = bytes.try_into().map_err(|_| {
            SecretError::crypto(format!("signature must be 64 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for SecretSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretSignature({}...)", &self.to_hex()[..16])
    }
}

/// The ReadOnly content encryption key.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; SYMMETRIC_KEY_SIZE]);

impl EncryptionKey {
    /// Derive from a public point.
    pub fn derive(public: &PublicKey) -> Self {
        Self(blake3::derive_key(ENCRYPTION_KEY_CONTEXT, &public.to_bytes()))
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; SYMMETRIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
        &self.0
    }

    /// Encrypt under a nonce drawn from `rng`. Output is `nonce || ciphertext`.
    pub fn encrypt<R: RngCore + CryptoRng>(
        &self,
        plaintext: &[u8],
        rng: &mut R,
    ) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| SecretError::crypto(e.to_string()))?;

        let mut nonce = [0u8; NONCE_SIZE];
        rng.try_fill_bytes(&mut nonce)
            .map_err(|e| SecretError::crypto(format!("nonce generation failed: {}", e)))?;

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| SecretError::crypto(format!("encryption failed: {}", e)))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Decrypt the output of [`EncryptionKey::encrypt`].
    pub fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < NONCE_SIZE {
            return Err(SecretError::crypto("sealed data shorter than its nonce"));
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);

        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| SecretError::crypto(e.to_string()))?;
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| SecretError::crypto(format!("decryption failed: {}", e)))
    }

    /// Keyed hash of a file path, stable for the whole share.
    pub fn path_id(&self, path: &str) -> PathId {
        PathId::from_bytes(*blake3::keyed_hash(&self.0, path.as_bytes()).as_bytes())
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(..)")
    }
}

/// The Download transfer key.
///
/// Derived from the public point under a context distinct from
/// [`EncryptionKey`], so the two keys are unrelated to anyone lacking the point.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DownloadKey([u8; SYMMETRIC_KEY_SIZE]);

impl DownloadKey {
    /// Derive from a public point.
    pub fn derive(public: &PublicKey) -> Self {
        Self(blake3::derive_key(DOWNLOAD_KEY_CONTEXT, &public.to_bytes()))
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; SYMMETRIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
        &self.0
    }

    /// The folder identifier shared by every secret of this share.
    pub fn folder_id(&self) -> FolderId {
        FolderId::from_bytes(blake3::derive_key(FOLDER_ID_CONTEXT, &self.0))
    }
}

impl fmt::Debug for DownloadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DownloadKey(..)")
    }
}
