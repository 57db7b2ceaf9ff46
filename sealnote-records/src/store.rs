//! Record store seam.
//!
//! The pipeline persists through this trait — it never touches disk or
//! network itself. Implementations are expected to return "not found"
//! distinguishably from "found but malformed" (the latter surfaces as
//! [`RecordError::MalformedRecord`] from their decode layer).

use crate::error::RecordResult;
use crate::record::StoredRecord;
use std::collections::HashMap;
use std::sync::RwLock;

/// Key-value storage for sealed records, keyed by `(owner_id, record_id)`.
pub trait RecordStore: Send + Sync {
    /// Inserts or wholesale-replaces a record. Never patches fields.
    fn put(&self, record: StoredRecord) -> RecordResult<()>;

    /// Fetches one record. `None` means not found.
    fn get(&self, owner_id: &str, record_id: &str) -> RecordResult<Option<StoredRecord>>;

    /// Removes one record. Returns whether it existed.
    fn delete(&self, owner_id: &str, record_id: &str) -> RecordResult<bool>;

    /// All records for one owner, oldest first.
    fn list(&self, owner_id: &str) -> RecordResult<Vec<StoredRecord>>;
}

/// In-memory record store for tests and embedding.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<(String, String), StoredRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn put(&self, record: StoredRecord) -> RecordResult<()> {
        let key = (record.owner_id.clone(), record.record_id.clone());
        self.records.write().unwrap().insert(key, record);
        Ok(())
    }

    fn get(&self, owner_id: &str, record_id: &str) -> RecordResult<Option<StoredRecord>> {
        let records = self.records.read().unwrap();
        Ok(records
            .get(&(owner_id.to_string(), record_id.to_string()))
            .cloned())
    }

    fn delete(&self, owner_id: &str, record_id: &str) -> RecordResult<bool> {
        let mut records = self.records.write().unwrap();
        Ok(records
            .remove(&(owner_id.to_string(), record_id.to_string()))
            .is_some())
    }

    fn list(&self, owner_id: &str) -> RecordResult<Vec<StoredRecord>> {
        let records = self.records.read().unwrap();
        let mut owned: Vec<StoredRecord> = records
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(owned)
    }
}
