//! SQLite bootstrap for the durable key-value storage backend.
//!
//! # Responsibility
//! - Open and configure SQLite connections.
//! - Bring the `kv_entries` schema up to the version this binary expects.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No collection data is read or written before migrations succeed.
//! - Failures are reported as `StorageError`, the same error storage
//!   callers already handle.

pub mod migrations;
mod open;

pub use migrations::SchemaState;
pub use open::{open_db, open_db_in_memory};
