//! Collection stored as one JSON array under one storage key.
//!
//! # Responsibility
//! - Implement `CollectionRepository` over any `KeyValueStorage`.
//! - Own id and timestamp assignment for local writes.
//!
//! # Invariants
//! - Every write is a full read-modify-write of the whole array; the last
//!   writer wins. A single active writer is assumed.
//! - Lookups are linear scans; no index is kept beside the array.
//! - A corrupt stored array is reported by `list`, and replaced by the next
//!   successful write.

use crate::clock::{Clock, SystemClock};
use crate::model::filter::RecordFilter;
use crate::model::record::{Fields, Record, RecordId};
use crate::repo::collection_repo::{CollectionRepository, RepoError, RepoResult};
use crate::storage::KeyValueStorage;
use log::{debug, warn};
use std::rc::Rc;

/// Local collection bound to one storage key.
pub struct LocalCollection<'s, S: KeyValueStorage + ?Sized> {
    storage: &'s S,
    key: String,
    clock: Rc<dyn Clock>,
}

impl<'s, S: KeyValueStorage + ?Sized> LocalCollection<'s, S> {
    pub fn new(storage: &'s S, key: impl Into<String>) -> Self {
        Self::with_clock(storage, key, Rc::new(SystemClock))
    }

    pub fn with_clock(storage: &'s S, key: impl Into<String>, clock: Rc<dyn Clock>) -> Self {
        Self {
            storage,
            key: key.into(),
            clock,
        }
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Reads and decodes the whole collection.
    pub fn load(&self) -> RepoResult<Vec<Record>> {
        let Some(raw) = self.storage.get_item(&self.key)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str::<Vec<Record>>(&raw).map_err(|err| RepoError::CorruptCollection {
            key: self.key.clone(),
            message: err.to_string(),
        })
    }

    /// Encodes and writes the whole collection.
    pub fn persist(&self, records: &[Record]) -> RepoResult<()> {
        let encoded = serde_json::to_string(records)
            .map_err(|err| RepoError::InvalidData(err.to_string()))?;
        self.storage.set_item(&self.key, &encoded)?;
        debug!(
            "event=collection_persist module=repo status=ok key={} count={} bytes={}",
            self.key,
            records.len(),
            encoded.len()
        );
        Ok(())
    }

    /// Replaces the stored collection wholesale (import path).
    ///
    /// Ids are kept as given; duplicates are rejected.
    pub fn replace_all(&self, records: Vec<Record>) -> RepoResult<()> {
        let mut seen = std::collections::HashSet::new();
        for record in &records {
            if !seen.insert(record.id.clone()) {
                return Err(RepoError::InvalidData(format!(
                    "duplicate record id `{}` in collection `{}`",
                    record.id, self.key
                )));
            }
        }
        self.persist(&records)
    }

    /// Drops the stored collection.
    pub fn clear(&self) -> RepoResult<()> {
        self.storage.remove_item(&self.key)?;
        Ok(())
    }

    fn load_for_write(&self) -> RepoResult<Vec<Record>> {
        match self.load() {
            Err(RepoError::CorruptCollection { key, message }) => {
                warn!(
                    "event=collection_heal module=repo status=discard_corrupt key={key} error={message}"
                );
                Ok(Vec::new())
            }
            other => other,
        }
    }
}

impl<S: KeyValueStorage + ?Sized> CollectionRepository for LocalCollection<'_, S> {
    fn name(&self) -> &str {
        self.key.as_str()
    }

    fn list(&self, filter: &RecordFilter) -> RepoResult<Vec<Record>> {
        Ok(filter.apply(self.load()?))
    }

    fn get(&self, id: &RecordId) -> RepoResult<Option<Record>> {
        Ok(self.load()?.into_iter().find(|record| &record.id == id))
    }

    fn create(&self, fields: Fields) -> RepoResult<Record> {
        let mut records = self.load_for_write()?;
        let mut record = Record::new(fields, self.clock.now_ms());
        while records.iter().any(|existing| existing.id == record.id) {
            record.id = RecordId::generate();
        }

        records.push(record.clone());
        self.persist(&records)?;
        Ok(record)
    }

    fn update(&self, id: &RecordId, fields: Fields) -> RepoResult<Record> {
        let mut records = self.load_for_write()?;
        let Some(record) = records.iter_mut().find(|record| &record.id == id) else {
            return Err(RepoError::NotFound(id.clone()));
        };

        record.apply(fields, self.clock.now_ms());
        let updated = record.clone();
        self.persist(&records)?;
        Ok(updated)
    }

    fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let mut records = self.load_for_write()?;
        let before = records.len();
        records.retain(|record| &record.id != id);
        if records.len() == before {
            return Err(RepoError::NotFound(id.clone()));
        }

        self.persist(&records)
    }
}
