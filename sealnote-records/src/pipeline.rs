//! The write/read/update/delete contract over a single logical record.

use crate::error::{RecordError, RecordResult};
use crate::record::{ReadRecord, ReadStatus, SealedRecord, StoredRecord};
use crate::store::RecordStore;
use chrono::Utc;
use sealnote_crypto::{content_digest, decrypt, encrypt, verify_digest, SealKey};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Placeholder body for records the cipher rejected.
pub const CORRUPTED_PLACEHOLDER: &str = "[content corrupted]";

/// Placeholder body for records that decrypted but failed the content
/// digest check.
pub const TAMPERED_PLACEHOLDER: &str = "[content failed verification]";

/// Result of a create or update: the stored envelope plus the caller's
/// content echoed back, avoiding a redundant decrypt round-trip.
#[derive(Clone, Debug)]
pub struct WriteOutcome {
    pub record: StoredRecord,
    pub content: String,
}

/// Orchestrates encryption and integrity verification around record CRUD.
///
/// Holds no mutable state — the key is immutable and storage lives behind
/// the [`RecordStore`] seam, so operations on different records run fully
/// in parallel.
pub struct RecordPipeline {
    key: SealKey,
    store: Arc<dyn RecordStore>,
}

impl RecordPipeline {
    pub fn new(key: SealKey, store: Arc<dyn RecordStore>) -> Self {
        Self { key, store }
    }

    /// Seals `content` into a new record owned by `owner_id`.
    ///
    /// Digest first, then encrypt, then store all four fields atomically
    /// under a fresh record id.
    pub fn create(&self, owner_id: &str, content: &str) -> RecordResult<WriteOutcome> {
        let record = self.seal(owner_id, &Uuid::new_v4().to_string(), content, None)?;
        self.store.put(record.clone())?;
        debug!(record_id = %record.record_id, "record created");
        Ok(WriteOutcome {
            record,
            content: content.to_string(),
        })
    }

    /// Reads and classifies one record.
    ///
    /// Tamper and corruption are classifications, not errors — only a
    /// missing record fails.
    pub fn read(&self, owner_id: &str, record_id: &str) -> RecordResult<ReadRecord> {
        let record = self
            .store
            .get(owner_id, record_id)?
            .ok_or_else(|| RecordError::NotFound(record_id.to_string()))?;
        Ok(self.classify(&record))
    }

    /// Reads every record for an owner, classifying each independently.
    /// One record's corruption never aborts the rest of the batch.
    pub fn read_all(&self, owner_id: &str) -> RecordResult<Vec<ReadRecord>> {
        let records = self.store.list(owner_id)?;
        Ok(records.iter().map(|r| self.classify(r)).collect())
    }

    /// Replaces a record's content wholesale: fresh nonce, fresh digest,
    /// all four fields swapped atomically. The prior nonce is never
    /// reused.
    pub fn update(
        &self,
        owner_id: &str,
        record_id: &str,
        new_content: &str,
    ) -> RecordResult<WriteOutcome> {
        let existing = self
            .store
            .get(owner_id, record_id)?
            .ok_or_else(|| RecordError::NotFound(record_id.to_string()))?;

        let record = self.seal(owner_id, record_id, new_content, Some(existing.created_at))?;
        self.store.put(record.clone())?;
        debug!(record_id = %record.record_id, "record replaced");
        Ok(WriteOutcome {
            record,
            content: new_content.to_string(),
        })
    }

    /// Removes a record. Reports not-found distinctly so callers can map
    /// to 404 vs 200.
    pub fn delete(&self, owner_id: &str, record_id: &str) -> RecordResult<()> {
        if !self.store.delete(owner_id, record_id)? {
            return Err(RecordError::NotFound(record_id.to_string()));
        }
        debug!(record_id = %record_id, "record deleted");
        Ok(())
    }

    fn seal(
        &self,
        owner_id: &str,
        record_id: &str,
        content: &str,
        created_at: Option<chrono::DateTime<Utc>>,
    ) -> RecordResult<StoredRecord> {
        let digest = content_digest(content.as_bytes());
        let parts = encrypt(&self.key, content.as_bytes())?;
        let now = Utc::now();
        Ok(StoredRecord {
            record_id: record_id.to_string(),
            owner_id: owner_id.to_string(),
            sealed: SealedRecord::from_parts(parts, digest),
            created_at: created_at.unwrap_or(now),
            modified_at: now,
        })
    }

    /// The tamper-disclosure policy. Cipher authentication runs first;
    /// the digest check runs on every successful decrypt. Unverified
    /// bytes never reach the caller.
    fn classify(&self, record: &StoredRecord) -> ReadRecord {
        let (content, status) = match decrypt(&self.key, &record.sealed.parts()) {
            Err(_) => {
                warn!(record_id = %record.record_id, "cipher rejected record, classifying corrupted");
                (CORRUPTED_PLACEHOLDER.to_string(), ReadStatus::Corrupted)
            }
            Ok(bytes) => {
                if !verify_digest(&bytes, &record.sealed.integrity_digest) {
                    warn!(record_id = %record.record_id, "content digest mismatch, classifying tampered");
                    (TAMPERED_PLACEHOLDER.to_string(), ReadStatus::Tampered)
                } else {
                    match String::from_utf8(bytes) {
                        Ok(text) => (text, ReadStatus::Clean),
                        // Digest matched non-text bytes: the record was
                        // written outside the text pipeline
                        Err(_) => {
                            warn!(record_id = %record.record_id, "record content is not UTF-8");
                            (CORRUPTED_PLACEHOLDER.to_string(), ReadStatus::Corrupted)
                        }
                    }
                }
            }
        };

        ReadRecord {
            record_id: record.record_id.clone(),
            content,
            status,
            created_at: record.created_at,
            modified_at: record.modified_at,
        }
    }
}
