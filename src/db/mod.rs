//! Connection layer: values, parameters, rows and database backends.
//!
//! This module provides everything the executor needs from a database:
//! - A `Connection` trait with SQLite (rusqlite) and PostgreSQL implementations
//! - `Value` / `Params` / `Row` types that keep driver types out of callers
//! - Configuration parsing (`DatabaseConfig`, `ConnectOptions`)
//! - Lexical helpers for identifier quoting and placeholder rewriting
//!
//! # Type Decisions
//!
//! **Why `i64` for every integer?**
//! SQLite stores all integers as 64-bit and PostgreSQL's widest integer is
//! `INT8`. Widening on read avoids lossy conversions; narrowing on bind is
//! checked.
//!
//! **Why insertion-ordered `Vec`s instead of `BTreeMap` for rows and named
//! parameters?**
//! Column order is part of a SELECT's contract and callers expect rows to
//! serialize in select order.

mod backend;
mod config;
mod escape;
mod params;
mod postgres;
mod row;
mod sqlite;
mod value;

pub use backend::{AnyConnection, Connection, Dialect, ExecOutcome, ResultSet};
pub use config::{connect, ConnectOptions, DatabaseConfig, PostgresConfig};
pub use escape::{
    is_identifier, replace_placeholders, scan_placeholders, Placeholder, PlaceholderSpan, QuoteStyle,
};
pub use params::Params;
pub use self::postgres::PostgresConnection;
pub use row::{ColumnKey, Row};
pub use sqlite::SqliteConnection;
pub use value::Value;

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to open database '{target}': {message}")]
    OpenFailed { target: String, message: String },

    #[error("Query failed: {message}")]
    QueryFailed { message: String },

    #[error("Unsupported type '{type_name}' in column '{column}'")]
    UnsupportedType { column: String, type_name: String },

    #[error("Missing value for parameter ':{name}'")]
    MissingParameter { name: String },

    #[error("Placeholder mismatch: {message}")]
    PlaceholderMismatch { message: String },

    #[error("Connection lock poisoned by a panicked thread")]
    LockPoisoned,
}
