//! Key-value storage medium behind local collections.
//!
//! # Responsibility
//! - Model the browser-storage contract (string keys to string values).
//! - Hide the concrete medium (memory, SQLite) from collection code.
//!
//! # Invariants
//! - Values are opaque strings; serialization belongs to callers.
//! - `get_item` on an absent key is `Ok(None)`, never an error.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod keys;
mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    /// The database was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// The connection has not been brought up to the current schema.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    QuotaExceeded {
        key: String,
        required_bytes: usize,
        quota_bytes: usize,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite storage failure: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "storage schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "storage connection is not migrated: expected schema {expected_version}, found {actual_version}"
            ),
            Self::QuotaExceeded {
                key,
                required_bytes,
                quota_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: {required_bytes} bytes > {quota_bytes} bytes"
            ),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::UninitializedConnection { .. }
            | Self::QuotaExceeded { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// String key-value storage, shaped after `window.localStorage`.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&self, key: &str) -> StorageResult<()>;
    /// Returns every stored key in ascending order.
    fn keys(&self) -> StorageResult<Vec<String>>;
}
