//! Content digests for defense-in-depth tamper evidence.
//!
//! A second signal independent of the AEAD tag: the digest is computed
//! over plaintext before encryption and checked after every successful
//! decrypt, so a record rewritten by a path that bypassed the cipher is
//! still caught.

use sha2::{Digest, Sha256};

/// Digest size in bytes (SHA-256).
pub const DIGEST_SIZE: usize = 32;

/// Computes the SHA-256 digest of record content.
pub fn content_digest(plaintext: &[u8]) -> [u8; DIGEST_SIZE] {
    Sha256::digest(plaintext).into()
}

/// Recomputes and compares the content digest.
///
/// Plain equality is used deliberately: the digest covers content whose
/// shape is not secret, and the AEAD tag is the authenticated check.
/// This comparison is an integrity signal, not a secret comparison.
pub fn verify_digest(plaintext: &[u8], digest: &[u8; DIGEST_SIZE]) -> bool {
    content_digest(plaintext) == *digest
}
