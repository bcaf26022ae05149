//! Collection repository contract and error model.

use crate::model::filter::RecordFilter;
use crate::model::record::{Fields, Record, RecordId};
use crate::remote::RemoteError;
use crate::storage::StorageError;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for collection persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Local storage medium failed.
    Storage(StorageError),
    /// REST collaborator failed or was unreachable.
    Remote(RemoteError),
    /// No record with this id exists in the collection.
    NotFound(RecordId),
    /// Stored collection value is not a valid JSON array of records.
    CorruptCollection { key: String, message: String },
    /// Data could not be encoded or had an unexpected shape.
    InvalidData(String),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Remote(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::CorruptCollection { key, message } => {
                write!(f, "corrupt collection `{key}`: {message}")
            }
            Self::InvalidData(message) => write!(f, "invalid record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Remote(err) => Some(err),
            Self::NotFound(_) | Self::CorruptCollection { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<RemoteError> for RepoError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

/// CRUD contract over one collection of records.
pub trait CollectionRepository {
    /// Storage key or resource path naming this collection.
    fn name(&self) -> &str;

    /// Returns the full filtered collection in insertion order.
    ///
    /// A collection that was never written is `Ok(vec![])`; unreadable data
    /// is an error so callers can tell "empty" from "read failed".
    fn list(&self, filter: &RecordFilter) -> RepoResult<Vec<Record>>;

    fn get(&self, id: &RecordId) -> RepoResult<Option<Record>>;

    /// Assigns id and `createdAt`, appends, persists, and returns the record.
    fn create(&self, fields: Fields) -> RepoResult<Record>;

    /// Merges `fields` into the record with `id` and stamps `updatedAt`.
    ///
    /// # Errors
    /// - `NotFound` when no record has this id; nothing is written.
    fn update(&self, id: &RecordId, fields: Fields) -> RepoResult<Record>;

    /// Removes the record with `id`.
    ///
    /// # Errors
    /// - `NotFound` when no record has this id; nothing is written.
    fn delete(&self, id: &RecordId) -> RepoResult<()>;

    /// Fail-soft listing: any error is logged and replaced by an empty list.
    fn list_or_empty(&self, filter: &RecordFilter) -> Vec<Record> {
        match self.list(filter) {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "event=collection_list module=repo status=fallback_empty collection={} error={}",
                    self.name(),
                    err
                );
                Vec::new()
            }
        }
    }
}
