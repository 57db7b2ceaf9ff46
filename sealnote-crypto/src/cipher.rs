//! Authenticated encryption of record content.
//!
//! ChaCha20-Poly1305 with a detached tag. Ciphertext is the same length
//! as the plaintext; the 16-byte Poly1305 tag and the 12-byte nonce are
//! carried as separate fields so the stored record keeps them inspectable.

use crate::error::{CryptoError, CryptoResult};
use crate::key::SealKey;
use chacha20poly1305::aead::{AeadCore, AeadInPlace, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce, Tag};
use serde::{Deserialize, Serialize};

/// Nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Output of one encryption: ciphertext plus the material needed to
/// authenticate and reverse it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SealedParts {
    /// Same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// Fresh CSPRNG output for every encryption. Never reused under a key.
    pub nonce: [u8; NONCE_SIZE],
    /// Detached Poly1305 tag binding ciphertext authenticity.
    pub auth_tag: [u8; TAG_SIZE],
}

/// Encrypts `plaintext` under `key` with a fresh random nonce.
///
/// The nonce is drawn from the OS CSPRNG on every call — it is never
/// derived from content or a counter, so reuse under the same key is
/// structurally impossible.
pub fn encrypt(key: &SealKey, plaintext: &[u8]) -> CryptoResult<SealedParts> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(&nonce, b"", &mut buffer)
        .map_err(|e| CryptoError::Encryption(format!("AEAD seal failed: {e}")))?;

    Ok(SealedParts {
        ciphertext: buffer,
        nonce: nonce.into(),
        auth_tag: tag.into(),
    })
}

/// Decrypts a sealed record part set, verifying the tag first.
///
/// No plaintext bytes are released unless the tag verifies. The failure
/// is a single opaque [`CryptoError::AuthenticationFailure`] regardless
/// of whether the ciphertext, nonce, or tag was the altered part.
pub fn decrypt(key: &SealKey, parts: &SealedParts) -> CryptoResult<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    let mut buffer = parts.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(&parts.nonce),
            b"",
            &mut buffer,
            Tag::from_slice(&parts.auth_tag),
        )
        .map_err(|_| CryptoError::AuthenticationFailure)?;

    Ok(buffer)
}

/// Encrypts a UTF-8 string.
pub fn encrypt_string(key: &SealKey, plaintext: &str) -> CryptoResult<SealedParts> {
    encrypt(key, plaintext.as_bytes())
}

/// Decrypts to a UTF-8 string.
pub fn decrypt_string(key: &SealKey, parts: &SealedParts) -> CryptoResult<String> {
    let bytes = decrypt(key, parts)?;
    String::from_utf8(bytes).map_err(|_| CryptoError::NotUtf8)
}
