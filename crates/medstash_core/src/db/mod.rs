//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the inventory store.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write inventory data before migrations succeed.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection was opened without running migrations.
    SchemaNotReady {
        db_version: u32,
        expected: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::SchemaNotReady {
                db_version,
                expected,
            } => write!(
                f,
                "database schema version {db_version} is not migrated (expected {expected})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::SchemaNotReady { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Verifies `conn` is on the latest schema and enforces foreign keys.
///
/// Repositories call this so a raw `Connection::open` cannot slip past
/// [`open_db`].
pub fn ensure_schema_ready(conn: &Connection) -> DbResult<()> {
    let db_version = migrations::current_user_version(conn)?;
    let expected = migrations::latest_version();
    if db_version != expected {
        return Err(DbError::SchemaNotReady {
            db_version,
            expected,
        });
    }
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(())
}
