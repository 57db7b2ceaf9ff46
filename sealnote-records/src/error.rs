//! Record pipeline error types.

use thiserror::Error;

/// Result type for record operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors that can occur in record pipeline operations.
#[derive(Debug, Error)]
pub enum RecordError {
    /// No record under this `(owner_id, record_id)`. Covers both truly
    /// absent records and records owned by someone else — the pipeline
    /// does not disclose which.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A stored record is missing fields or has length-invalid fields.
    /// Hard error, distinct from the soft tamper classifications.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// The storage collaborator failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Crypto failure outside the per-record tamper policy (e.g. the
    /// seal operation itself failed on write).
    #[error("crypto error: {0}")]
    Crypto(#[from] sealnote_crypto::CryptoError),
}
