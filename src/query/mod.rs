//! Fluent statement building, compilation and execution.
//!
//! ```no_run
//! use fluent_query::db::SqliteConnection;
//! use fluent_query::query::Db;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Db::new(SqliteConnection::open_in_memory()?);
//! let rows = db
//!     .table("users")
//!     .where_op("votes", ">", 100)
//!     .or_where_op("name", "like", "T%")
//!     .all(&db)?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```
//!
//! A `Statement` is built by chained calls, compiled by a `Compiler` into SQL
//! text plus parameters, and executed through the `Db` handle's connection by
//! one terminal call.

pub mod builder;
pub mod clause;
pub mod compiler;
pub mod executor;
pub mod params;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::db::{Connection, DbError, Params};

pub use builder::Statement;
pub use clause::{
    Condition, Connector, Direction, Filter, GroupItem, Join, JoinCondition, JoinKind, Operation,
    Operator, OrderItem, Predicate, Values,
};
pub use compiler::Compiler;
pub use executor::{FetchStyle, Fetched, Inserted};
pub use params::{ParamBuilder, PlaceholderStyle};

/// A malformed or incomplete statement, detected before any database call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("No table set on statement")]
    MissingTable,

    #[error("Table name must not be empty")]
    EmptyTable,

    #[error("{operation} requires at least one column value")]
    EmptyValues { operation: Operation },

    #[error("Limit must not be negative (got {0})")]
    NegativeLimit(i64),

    #[error("Offset must not be negative (got {0})")]
    NegativeOffset(i64),

    #[error("Unrecognized operator '{0}'")]
    InvalidOperator(String),

    #[error("Predicate group must contain at least one condition")]
    EmptyGroup,

    #[error("Raw fragment has {placeholders} '?' placeholders but {params} parameters")]
    RawParamMismatch { placeholders: usize, params: usize },

    #[error("Raw fragment parameters are positional; use '?' instead of named placeholders in: {0}")]
    NamedRawPlaceholder(String),

    #[error("Raw SQL fragment must not be empty")]
    EmptyRawFragment,

    #[error("Statement is already {current}; cannot change it to {requested}")]
    OperationConflict { current: Operation, requested: Operation },

    #[error("{terminal}() cannot run a {operation} statement")]
    UnsupportedOperation {
        operation: Operation,
        terminal: &'static str,
    },

    #[error("{operation} without a WHERE clause requires unconditional()")]
    UnconditionalMutation { operation: Operation },
}

/// Error returned by terminal calls.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The connection rejected or failed the statement. Parameter values are
    /// never included.
    #[error("Query execution failed ({param_count} params): {sql}: {source}")]
    Execution {
        sql: String,
        param_count: usize,
        #[source]
        source: DbError,
    },

    #[error("Column index {index} out of range for result with {columns} columns")]
    ColumnOutOfRange { index: usize, columns: usize },
}

/// SQL text plus the parameters bound to its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Params,
    /// Caller-supplied text from `raw_sql`. Its placeholders are the
    /// caller's, not the compiler's.
    pub raw: bool,
}

impl CompiledQuery {
    pub(crate) fn raw(sql: String, params: Params) -> Self {
        Self {
            sql,
            params,
            raw: true,
        }
    }
}

/// Handle that owns a connection and the compiler used for it.
///
/// Cloning is cheap; clones share the connection.
#[derive(Clone)]
pub struct Db {
    conn: Arc<dyn Connection>,
    compiler: Compiler,
}

impl Db {
    /// Wrap a connection, using the compiler defaults for its dialect.
    pub fn new(conn: impl Connection + 'static) -> Self {
        Self::from_arc(Arc::new(conn))
    }

    pub fn from_arc(conn: Arc<dyn Connection>) -> Self {
        let compiler = Compiler::for_dialect(conn.dialect());
        Self { conn, compiler }
    }

    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    /// The live connection statements execute against.
    pub fn connection(&self) -> &dyn Connection {
        self.conn.as_ref()
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Start a statement against `name`.
    pub fn table(&self, name: impl Into<String>) -> Statement {
        Statement::new().table(name)
    }

    /// Start a statement that runs `sql` verbatim with `params`.
    pub fn raw_sql(&self, sql: impl Into<String>, params: impl Into<Params>) -> Statement {
        Statement::new().raw_sql(sql, params)
    }

    /// Compile without executing.
    pub fn to_sql(&self, statement: &Statement) -> Result<CompiledQuery, BuildError> {
        self.compiler.compile(statement)
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("backend", &self.conn.backend_name())
            .field("compiler", &self.compiler)
            .finish()
    }
}
