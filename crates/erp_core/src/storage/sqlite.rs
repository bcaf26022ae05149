//! SQLite-backed storage medium.
//!
//! # Invariants
//! - Only connections opened through `db::open_db*` (fully migrated) are
//!   accepted.
//! - `set_item` is an upsert; one row per key.

use super::{KeyValueStorage, StorageError, StorageResult};
use crate::db::migrations::{current_user_version, latest_version, schema_state};
use crate::db::SchemaState;
use rusqlite::{params, Connection, OptionalExtension};

/// Durable storage over the `kv_entries` table.
pub struct SqliteStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStorage<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations are still pending.
    /// - `UnsupportedSchemaVersion` when a newer binary wrote the schema.
    pub fn try_new(conn: &'conn Connection) -> StorageResult<Self> {
        match schema_state(conn)?.ensure_supported()? {
            SchemaState::Current => Ok(Self { conn }),
            _ => Err(StorageError::UninitializedConnection {
                expected_version: latest_version(),
                actual_version: current_user_version(conn)?,
            }),
        }
    }
}

impl KeyValueStorage for SqliteStorage<'_> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            keys.push(row.get::<_, String>(0)?);
        }
        Ok(keys)
    }
}
