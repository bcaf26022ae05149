//! Schema migrations for the key-value table.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Each applied step is mirrored to `PRAGMA user_version` inside the same
//!   transaction, so a failed step leaves the previous version in place.

use crate::storage::{StorageError, StorageResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// How a connection's schema relates to this binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Current,
    /// Older schema; `apply_migrations` can upgrade it.
    Behind { version: u32 },
    /// Written by a newer binary; must not be touched.
    Ahead { version: u32 },
}

impl SchemaState {
    /// Fails for schemas this binary cannot work with.
    pub fn ensure_supported(self) -> StorageResult<Self> {
        match self {
            Self::Ahead { version } => Err(StorageError::UnsupportedSchemaVersion {
                db_version: version,
                latest_supported: latest_version(),
            }),
            other => Ok(other),
        }
    }
}

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads the schema version stored in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> StorageResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

pub fn schema_state(conn: &Connection) -> StorageResult<SchemaState> {
    let version = current_user_version(conn)?;
    let latest = latest_version();
    Ok(if version == latest {
        SchemaState::Current
    } else if version < latest {
        SchemaState::Behind { version }
    } else {
        SchemaState::Ahead { version }
    })
}

/// Upgrades an older schema; rejects one written by a newer binary.
pub fn apply_migrations(conn: &mut Connection) -> StorageResult<()> {
    let SchemaState::Behind { version: from } = schema_state(conn)?.ensure_supported()? else {
        return Ok(());
    };

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|migration| migration.version > from) {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        info!(
            "event=db_migrate module=db status=step version={}",
            migration.version
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={from} to_version={}",
        latest_version()
    );
    Ok(())
}
