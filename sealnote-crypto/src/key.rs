//! Key containers.
//!
//! Both containers zeroize their material on drop and print redacted
//! `Debug` output so keys never land in logs by accident.

use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric key size in bytes (ChaCha20-Poly1305).
pub const KEY_SIZE: usize = 32;

/// Minimum signing secret length in bytes.
pub const MIN_SECRET_SIZE: usize = 32;

/// Process-wide symmetric key for record encryption.
///
/// Exactly 32 bytes, loaded once at startup and passed explicitly into
/// whatever needs it.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SealKey([u8; KEY_SIZE]);

impl SealKey {
    /// Wraps raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Validates length and wraps a byte slice.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Decodes a base64 key as supplied by the configuration provider.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::KeyDecode(format!("seal key: {e}")))?;
        Self::from_slice(&bytes)
    }

    /// Generates a fresh random key (tests, provisioning tools).
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SealKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SealKey(..)")
    }
}

/// Secret used to sign access tokens.
///
/// Arbitrary length, minimum 32 bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Validates minimum length and wraps secret bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> CryptoResult<Self> {
        if bytes.len() < MIN_SECRET_SIZE {
            return Err(CryptoError::SigningSecretTooShort {
                min: MIN_SECRET_SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }

    /// Decodes a base64 secret as supplied by the configuration provider.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::KeyDecode(format!("signing secret: {e}")))?;
        Self::from_bytes(bytes)
    }

    /// Generates a fresh 32-byte random secret (tests, provisioning tools).
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; MIN_SECRET_SIZE];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_key() {
        let err = SealKey::from_slice(&[0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidKeyLength { expected: 32, actual: 16 }
        ));
    }

    #[test]
    fn rejects_long_key() {
        assert!(SealKey::from_slice(&[0u8; 33]).is_err());
    }

    #[test]
    fn base64_roundtrip() {
        use base64::{engine::general_purpose::STANDARD, Engine};
        let key = SealKey::generate();
        let encoded = STANDARD.encode(key.as_bytes());
        let decoded = SealKey::from_base64(&encoded).unwrap();
        assert_eq!(key.as_bytes(), decoded.as_bytes());
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            SealKey::from_base64("not!!base64"),
            Err(CryptoError::KeyDecode(_))
        ));
    }

    #[test]
    fn rejects_short_signing_secret() {
        let err = SigningSecret::from_bytes(vec![0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::SigningSecretTooShort { min: 32, actual: 16 }
        ));
    }

    #[test]
    fn accepts_long_signing_secret() {
        assert!(SigningSecret::from_bytes(vec![0u8; 64]).is_ok());
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = SealKey::generate();
        assert_eq!(format!("{key:?}"), "SealKey(..)");
        let secret = SigningSecret::generate();
        assert_eq!(format!("{secret:?}"), "SigningSecret(..)");
    }
}
