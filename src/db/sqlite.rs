//! SQLite connection backed by rusqlite.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, OpenFlags, Statement, ToSql};
use tracing::debug;

use super::backend::{Connection, Dialect, ExecOutcome, ResultSet};
use super::config::ConnectOptions;
use super::params::Params;
use super::value::Value;
use super::DbError;

/// SQLite database, either file-backed or in-memory.
///
/// `rusqlite::Connection` is not `Sync`, so the handle lives behind a mutex.
/// The lock is held for exactly one prepare/execute call.
pub struct SqliteConnection {
    conn: Mutex<rusqlite::Connection>,
    name: &'static str,
}

impl SqliteConnection {
    /// Open a SQLite database file, creating it unless `read_only` is set.
    pub fn open(path: &Path, options: &ConnectOptions) -> Result<Self, DbError> {
        let flags = if options.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI
        } else {
            OpenFlags::default()
        };
        let conn = rusqlite::Connection::open_with_flags(path, flags).map_err(|e| {
            DbError::OpenFailed {
                target: path.display().to_string(),
                message: e.to_string(),
            }
        })?;
        if let Some(ms) = options.busy_timeout_ms {
            conn.busy_timeout(Duration::from_millis(ms))
                .map_err(|e| DbError::OpenFailed {
                    target: path.display().to_string(),
                    message: e.to_string(),
                })?;
        }
        debug!(path = %path.display(), read_only = options.read_only, "opened sqlite database");
        Ok(Self {
            conn: Mutex::new(conn),
            name: "Sqlite",
        })
    }

    /// Create an in-memory database.
    ///
    /// Used for tests to avoid disk I/O and temp file management.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = rusqlite::Connection::open_in_memory().map_err(|e| DbError::OpenFailed {
            target: ":memory:".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            conn: Mutex::new(conn),
            name: "SqliteMem",
        })
    }

    /// Run a batch of `;`-separated statements without parameters.
    ///
    /// Handy for fixtures; not part of the `Connection` contract.
    pub fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        self.lock()?.execute_batch(sql).map_err(query_failed)
    }

    fn lock(&self) -> Result<MutexGuard<'_, rusqlite::Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }
}

impl Connection for SqliteConnection {
    fn query(&self, sql: &str, params: &Params) -> Result<ResultSet, DbError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(query_failed)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = match params {
            Params::Positional(values) => stmt.query(params_from_iter(values.iter())),
            Params::Named(pairs) => {
                let names = prefixed_names(pairs);
                let bound = bind_named(&stmt, &names, pairs)?;
                stmt.query(bound.as_slice())
            }
        }
        .map_err(query_failed)?;

        let mut result = ResultSet {
            columns,
            rows: Vec::new(),
        };
        while let Some(row) = rows.next().map_err(query_failed)? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(from_value_ref(row.get_ref(i).map_err(query_failed)?));
            }
            result.rows.push(values);
        }
        Ok(result)
    }

    fn execute(&self, sql: &str, params: &Params) -> Result<ExecOutcome, DbError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(query_failed)?;
        let affected = match params {
            Params::Positional(values) => stmt.execute(params_from_iter(values.iter())),
            Params::Named(pairs) => {
                let names = prefixed_names(pairs);
                let bound = bind_named(&stmt, &names, pairs)?;
                stmt.execute(bound.as_slice())
            }
        }
        .map_err(query_failed)?;

        Ok(ExecOutcome {
            affected_rows: affected as u64,
            last_insert_id: (affected > 0).then(|| conn.last_insert_rowid()),
        })
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn backend_name(&self) -> &'static str {
        self.name
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Value::Int(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}

// rusqlite matches named parameters including their sigil.
fn prefixed_names(pairs: &[(String, Value)]) -> Vec<String> {
    pairs.iter().map(|(name, _)| format!(":{name}")).collect()
}

/// Pair each name the statement uses with its value. Names the statement
/// does not use are skipped; a used name with no value is an error.
fn bind_named<'a>(
    stmt: &Statement<'_>,
    names: &'a [String],
    pairs: &'a [(String, Value)],
) -> Result<Vec<(&'a str, &'a dyn ToSql)>, DbError> {
    for index in 1..=stmt.parameter_count() {
        if let Some(name) = stmt.parameter_name(index) {
            if !names.iter().any(|n| n == name) {
                return Err(DbError::MissingParameter {
                    name: name.trim_start_matches([':', '@', '$']).to_string(),
                });
            }
        }
    }
    Ok(names
        .iter()
        .zip(pairs)
        .filter(|(name, _)| matches!(stmt.parameter_index(name), Ok(Some(_))))
        .map(|(name, (_, value))| (name.as_str(), value as &dyn ToSql))
        .collect())
}

fn query_failed(e: rusqlite::Error) -> DbError {
    DbError::QueryFailed {
        message: e.to_string(),
    }
}
