//! Key-value store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide whole-value reads and writes addressed by [`StoreKey`].
//! - Reject connections whose schema was not migrated by `db::open_db*`.
//!
//! # Invariants
//! - A write replaces the full value stored under a key.
//! - Multi-key writes run in one transaction.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use log::{error, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Well-known names under which collections are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Stages,
    Schedules,
    Students,
    Instructors,
    Attendance,
    Users,
    Config,
    Session,
    IdSequence,
}

impl StoreKey {
    pub const ALL: [StoreKey; 9] = [
        StoreKey::Stages,
        StoreKey::Schedules,
        StoreKey::Students,
        StoreKey::Instructors,
        StoreKey::Attendance,
        StoreKey::Users,
        StoreKey::Config,
        StoreKey::Session,
        StoreKey::IdSequence,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stages => "stages",
            Self::Schedules => "schedules",
            Self::Students => "students",
            Self::Instructors => "instructors",
            Self::Attendance => "attendance",
            Self::Users => "users",
            Self::Config => "config",
            Self::Session => "session",
            Self::IdSequence => "id_sequence",
        }
    }
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the key-value store.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite failure.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "store requires table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "store requires column `{column}` in table `{table}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Whole-value key-value storage.
pub trait KeyValueStore {
    /// Returns the stored text, or `None` when the key was never written.
    fn get(&self, key: StoreKey) -> StoreResult<Option<String>>;
    fn set(&self, key: StoreKey, value: &str) -> StoreResult<()>;
    /// Writes every entry or none of them.
    fn set_many(&self, entries: &[(StoreKey, String)]) -> StoreResult<()>;
    fn remove(&self, key: StoreKey) -> StoreResult<()>;
    fn clear(&self) -> StoreResult<()>;
}

const UPSERT_SQL: &str = "INSERT INTO kv_entries (key, value, updated_at)
     VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
     ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at;";

/// SQLite-backed key-value store over the `kv_entries` table.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn get(&self, key: StoreKey) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|err| {
                error!("event=store_get module=store status=error key={key} error={err}");
                err
            })?;
        Ok(value)
    }

    fn set(&self, key: StoreKey, value: &str) -> StoreResult<()> {
        if let Err(err) = self.conn.execute(UPSERT_SQL, params![key.as_str(), value]) {
            error!("event=store_set module=store status=error key={key} error={err}");
            return Err(err.into());
        }
        Ok(())
    }

    fn set_many(&self, entries: &[(StoreKey, String)]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in entries {
            if let Err(err) = tx.execute(UPSERT_SQL, params![key.as_str(), value.as_str()]) {
                error!(
                    "event=store_set_many module=store status=error key={key} entries={} error={err}",
                    entries.len()
                );
                return Err(err.into());
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key.as_str()])?;
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let removed = self.conn.execute("DELETE FROM kv_entries;", [])?;
        warn!("event=store_clear module=store status=ok removed={removed}");
        Ok(())
    }
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "kv_entries")? {
        return Err(StoreError::MissingRequiredTable("kv_entries"));
    }

    for column in ["key", "value", "updated_at"] {
        if !table_has_column(conn, "kv_entries", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "kv_entries",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
