//! Database module for persistent storage.
//!
//! Uses rusqlite (SQLite) with a thread-safe `Database` handle.
//! All access is serialized through a `Mutex<Connection>`, so a transaction
//! opened with `BEGIN` covers every later call on the same handle.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::types::{ToSql, ToSqlOutput, Value};
use rusqlite::Connection;

use crate::mapper::{ColumnMap, FieldValue};

pub mod agent_repo;
pub mod error;
pub mod item_repo;
pub mod job_repo;
pub mod migrations;
pub mod store;

pub use error::DatabaseError;
pub use store::SqliteStore;

/// Thread-safe database handle wrapping a single rusqlite connection.
///
/// Cloning is cheap (inner `Arc`).
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database at the given path and runs all
    /// pending migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        migrations::run_all(&conn)?;

        log::info!("Database opened at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database for testing. Runs all migrations.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        migrations::run_all(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Provides locked access to the underlying connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }
}

/// Returns the canonical database path: `~/.t1250/data/t1250.db`.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".t1250").join("data").join("t1250.db"))
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            FieldValue::Text(s) => Ok(ToSqlOutput::from(s.as_str())),
            FieldValue::Null => Ok(ToSqlOutput::Owned(Value::Null)),
        }
    }
}

/// Inserts one row built from a column map plus store-managed columns.
/// Every mapped column must appear in `allowed`.
fn insert_columns(
    conn: &Connection,
    table: &str,
    allowed: &[&str],
    columns: &ColumnMap,
    managed: &[(&str, &dyn ToSql)],
) -> Result<i64, DatabaseError> {
    let mut names: Vec<&str> = Vec::with_capacity(columns.len() + managed.len());
    let mut values: Vec<&dyn ToSql> = Vec::with_capacity(columns.len() + managed.len());

    for (column, value) in columns {
        if !allowed.contains(&column.as_str()) {
            return Err(DatabaseError::InvalidColumn {
                table: table.to_string(),
                column: column.clone(),
            });
        }
        names.push(column.as_str());
        values.push(value);
    }
    for (column, value) in managed {
        names.push(*column);
        values.push(*value);
    }

    let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        names.join(", "),
        placeholders.join(", ")
    );

    conn.execute(&sql, values.as_slice())?;
    Ok(conn.last_insert_rowid())
}

/// Current time as a fixed-width RFC 3339 string, so text ordering matches
/// time ordering.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
