//! Stored record types and their persisted encodings.
//!
//! Wire format follows the record-store contract: ciphertext, nonce, and
//! auth tag travel as base64 text, the integrity digest as lowercase hex.

use crate::error::{RecordError, RecordResult};
use chrono::{DateTime, Utc};
use sealnote_crypto::{SealedParts, DIGEST_SIZE, NONCE_SIZE, TAG_SIZE};
use serde::{Deserialize, Serialize};

/// One record's encrypted form: everything needed to authenticate and
/// reverse the encryption, plus the independent content digest.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SealedRecord {
    /// Same length as the plaintext.
    #[serde(with = "b64_vec")]
    pub ciphertext: Vec<u8>,
    /// 12 bytes, unique per encryption under a given key.
    #[serde(with = "b64_arr")]
    pub nonce: [u8; NONCE_SIZE],
    /// 16-byte Poly1305 tag.
    #[serde(with = "b64_arr")]
    pub auth_tag: [u8; TAG_SIZE],
    /// 32-byte SHA-256 of the original plaintext, computed before
    /// encryption.
    #[serde(with = "hex_arr")]
    pub integrity_digest: [u8; DIGEST_SIZE],
}

impl SealedRecord {
    /// Assembles a sealed record from loose field bytes, validating every
    /// length. A missing or length-invalid field is a hard
    /// [`RecordError::MalformedRecord`], never a soft tamper flag.
    pub fn new(
        ciphertext: Vec<u8>,
        nonce: &[u8],
        auth_tag: &[u8],
        integrity_digest: &[u8],
    ) -> RecordResult<Self> {
        Ok(Self {
            ciphertext,
            nonce: nonce
                .try_into()
                .map_err(|_| malformed("nonce", NONCE_SIZE, nonce.len()))?,
            auth_tag: auth_tag
                .try_into()
                .map_err(|_| malformed("auth tag", TAG_SIZE, auth_tag.len()))?,
            integrity_digest: integrity_digest
                .try_into()
                .map_err(|_| malformed("integrity digest", DIGEST_SIZE, integrity_digest.len()))?,
        })
    }

    /// Builds the sealed form from a fresh encryption plus its content
    /// digest.
    pub fn from_parts(parts: SealedParts, integrity_digest: [u8; DIGEST_SIZE]) -> Self {
        Self {
            ciphertext: parts.ciphertext,
            nonce: parts.nonce,
            auth_tag: parts.auth_tag,
            integrity_digest,
        }
    }

    /// View as cipher input for decryption.
    pub fn parts(&self) -> SealedParts {
        SealedParts {
            ciphertext: self.ciphertext.clone(),
            nonce: self.nonce,
            auth_tag: self.auth_tag,
        }
    }
}

fn malformed(field: &str, expected: usize, actual: usize) -> RecordError {
    RecordError::MalformedRecord(format!("{field}: expected {expected} bytes, got {actual}"))
}

/// A sealed record as held by the record store, with its identity and
/// timestamps.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredRecord {
    pub record_id: String,
    pub owner_id: String,
    #[serde(flatten)]
    pub sealed: SealedRecord,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Outcome classification of one record read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadStatus {
    /// Cipher tag and content digest both verified.
    Clean,
    /// Decryption succeeded but the content digest did not match. The
    /// content is recoverable yet untrustworthy, so it is withheld.
    Tampered,
    /// The cipher rejected the record; content is unrecoverable.
    Corrupted,
}

impl ReadStatus {
    /// True for anything other than a clean read.
    pub fn tampered(&self) -> bool {
        !matches!(self, ReadStatus::Clean)
    }

    /// Whether decryption itself succeeded.
    pub fn decrypted(&self) -> bool {
        !matches!(self, ReadStatus::Corrupted)
    }
}

/// One record as returned to callers: content (or the policy placeholder)
/// plus its classification.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadRecord {
    pub record_id: String,
    pub content: String,
    pub status: ReadStatus,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

mod b64_vec {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        STANDARD.decode(text).map_err(de::Error::custom)
    }
}

mod b64_arr {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<const N: usize, S: Serializer>(
        bytes: &[u8; N],
        s: S,
    ) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, const N: usize, D: Deserializer<'de>>(
        d: D,
    ) -> Result<[u8; N], D::Error> {
        let text = String::deserialize(d)?;
        let bytes = STANDARD.decode(text).map_err(de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|v: Vec<u8>| de::Error::custom(format!("expected {N} bytes, got {}", v.len())))
    }
}

mod hex_arr {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<const N: usize, S: Serializer>(
        bytes: &[u8; N],
        s: S,
    ) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, const N: usize, D: Deserializer<'de>>(
        d: D,
    ) -> Result<[u8; N], D::Error> {
        let text = String::deserialize(d)?;
        let bytes = hex::decode(text).map_err(de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|v: Vec<u8>| de::Error::custom(format!("expected {N} bytes, got {}", v.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SealedRecord {
        SealedRecord::new(
            vec![1, 2, 3],
            &[0u8; NONCE_SIZE],
            &[0u8; TAG_SIZE],
            &[0xABu8; DIGEST_SIZE],
        )
        .unwrap()
    }

    #[test]
    fn short_nonce_is_malformed() {
        let err = SealedRecord::new(vec![1], &[0u8; 8], &[0u8; TAG_SIZE], &[0u8; DIGEST_SIZE])
            .unwrap_err();
        assert!(matches!(err, RecordError::MalformedRecord(_)));
    }

    #[test]
    fn short_tag_is_malformed() {
        let err = SealedRecord::new(vec![1], &[0u8; NONCE_SIZE], &[0u8; 4], &[0u8; DIGEST_SIZE])
            .unwrap_err();
        assert!(matches!(err, RecordError::MalformedRecord(_)));
    }

    #[test]
    fn short_digest_is_malformed() {
        let err = SealedRecord::new(vec![1], &[0u8; NONCE_SIZE], &[0u8; TAG_SIZE], &[0u8; 16])
            .unwrap_err();
        assert!(matches!(err, RecordError::MalformedRecord(_)));
    }

    #[test]
    fn wire_format_uses_base64_and_hex() {
        let json = serde_json::to_value(sample()).unwrap();
        // Digest must be lowercase hex, the rest base64
        assert_eq!(
            json["integrity_digest"].as_str().unwrap(),
            "ab".repeat(DIGEST_SIZE)
        );
        assert_eq!(json["ciphertext"].as_str().unwrap(), "AQID");
    }

    #[test]
    fn wire_roundtrip() {
        let record = sample();
        let json = serde_json::to_string(&record).unwrap();
        let back: SealedRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ciphertext, record.ciphertext);
        assert_eq!(back.nonce, record.nonce);
        assert_eq!(back.auth_tag, record.auth_tag);
        assert_eq!(back.integrity_digest, record.integrity_digest);
    }

    #[test]
    fn truncated_wire_digest_rejected() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["integrity_digest"] = "abab".into();
        assert!(serde_json::from_value::<SealedRecord>(json).is_err());
    }

    #[test]
    fn status_flags() {
        assert!(!ReadStatus::Clean.tampered());
        assert!(ReadStatus::Clean.decrypted());
        assert!(ReadStatus::Tampered.tampered());
        assert!(ReadStatus::Tampered.decrypted());
        assert!(ReadStatus::Corrupted.tampered());
        assert!(!ReadStatus::Corrupted.decrypted());
    }
}
