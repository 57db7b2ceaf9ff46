//! Encryption and integrity layer for Sealnote.
//!
//! Provides the cryptographic core of the record pipeline:
//! - ChaCha20-Poly1305 for authenticated encryption of record content
//! - SHA-256 content digests for defense-in-depth tamper evidence
//! - Key containers with zeroization
//!
//! # Architecture
//!
//! Two independent tamper-evidence signals protect every record:
//!
//! 1. **AEAD tag**: produced by the cipher at encryption time. Decryption
//!    verifies it before any plaintext is released, so corruption of the
//!    ciphertext, nonce, or tag is always caught by the cipher itself.
//!
//! 2. **Content digest**: a SHA-256 hash of the plaintext computed before
//!    encryption and stored alongside the ciphertext. It catches records
//!    that were rewritten by a path that bypassed the cipher entirely.
//!
//! Both signals must pass for a record to be considered untampered.
//!
//! Keys are values passed explicitly into constructors — nothing in this
//! crate reads ambient process state, so tests can run with fixed keys
//! and no cross-test leakage.

mod cipher;
mod config;
mod digest;
mod error;
mod key;

pub use cipher::{
    decrypt, decrypt_string, encrypt, encrypt_string, SealedParts, NONCE_SIZE, TAG_SIZE,
};
pub use config::KeyConfig;
pub use digest::{content_digest, verify_digest, DIGEST_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{SealKey, SigningSecret, KEY_SIZE, MIN_SECRET_SIZE};
