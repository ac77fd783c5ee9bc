//! Database file that backs the `kv_entries` key-value table.
//!
//! # Responsibility
//! - Open the store file (or an in-memory scratch store) and migrate it to
//!   the layout this build reads and writes.
//!
//! # Failure modes
//! - The file cannot be opened, is locked past the busy timeout, or is not
//!   an SQLite database: `DbError::Sqlite`.
//! - The file was written by a newer Rollcall build:
//!   `DbError::UnsupportedSchemaVersion`. It is left untouched so that build
//!   can still read it.
//!
//! # Invariants
//! - The store layout version lives in `PRAGMA user_version`.
//! - No key is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the store database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Store layout is newer than this build understands.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "store database error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store was written by a newer version (layout {db_version}, this build supports up to {latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn newer_store_message_names_both_versions() {
        let err = DbError::UnsupportedSchemaVersion {
            db_version: 3,
            latest_supported: 1,
        };
        let message = err.to_string();
        assert!(message.contains("layout 3"));
        assert!(message.contains("up to 1"));
        assert!(err.source().is_none());
    }

    #[test]
    fn sqlite_failure_keeps_its_source() {
        let err = DbError::from(rusqlite::Error::InvalidQuery);
        assert!(err.to_string().starts_with("store database error"));
        assert!(err.source().is_some());
    }
}
