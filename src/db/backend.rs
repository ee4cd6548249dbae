//! Connection abstraction consumed by the executor.
//!
//! A connection owns a live database handle and exposes the two primitives
//! the executor needs: run a statement that returns rows, and run a statement
//! that returns an affected-row count. Pooling, reconnection and transactions
//! stay with the implementation.

use enum_dispatch::enum_dispatch;

use super::params::Params;
use super::postgres::PostgresConnection;
use super::sqlite::SqliteConnection;
use super::value::Value;
use super::DbError;

/// SQL dialect spoken by a connection.
///
/// The compiler derives its default placeholder and quoting style from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// `?` placeholders, no identifier quoting, no dialect quirks.
    #[default]
    Generic,
    Sqlite,
    Postgres,
}

/// Rows returned by a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    pub affected_rows: u64,
    /// Row id generated by the last insert, when the driver reports one.
    pub last_insert_id: Option<i64>,
}

/// Trait for database connections that can prepare and execute statements.
#[enum_dispatch]
pub trait Connection: Send + Sync {
    /// Prepare and run a statement, returning its rows.
    fn query(&self, sql: &str, params: &Params) -> Result<ResultSet, DbError>;

    /// Prepare and run a statement, returning the affected-row count.
    fn execute(&self, sql: &str, params: &Params) -> Result<ExecOutcome, DbError>;

    /// Run compiler output whose placeholders already follow `dialect()`.
    ///
    /// `query` may rewrite placeholders in caller-written SQL; this must not.
    fn query_compiled(&self, sql: &str, params: &Params) -> Result<ResultSet, DbError> {
        self.query(sql, params)
    }

    /// `execute` counterpart of `query_compiled`.
    fn execute_compiled(&self, sql: &str, params: &Params) -> Result<ExecOutcome, DbError> {
        self.execute(sql, params)
    }

    fn dialect(&self) -> Dialect;

    /// Get the backend name for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// Every connection type this crate can open from configuration.
#[enum_dispatch(Connection)]
pub enum AnyConnection {
    Sqlite(SqliteConnection),
    Postgres(PostgresConnection),
}
