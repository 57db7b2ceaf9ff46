//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in the encryption and integrity layer.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key material has the wrong length. Fatal at startup.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Signing secret is below the minimum length. Fatal at startup.
    #[error("signing secret too short: need at least {min} bytes, got {actual}")]
    SigningSecretTooShort { min: usize, actual: usize },

    /// Key material could not be decoded from its configured encoding.
    /// Fatal at startup.
    #[error("key decode error: {0}")]
    KeyDecode(String),

    /// The AEAD seal operation failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The cipher rejected the ciphertext/nonce/tag triple. Deliberately
    /// carries no detail about which part was altered.
    #[error("authentication failure: ciphertext rejected")]
    AuthenticationFailure,

    /// Decrypted bytes were expected to be UTF-8 text and were not.
    #[error("decrypted content is not valid UTF-8")]
    NotUtf8,
}
