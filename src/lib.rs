//! fluent_query library - fluent SQL statement builder
//!
//! Provides the statement builder, compiler and executor (`query`), the
//! connection layer they run on (`db`), and the command and output
//! infrastructure behind the `fluent_query` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod output;
pub mod query;

#[macro_use]
pub mod test_macros;

#[cfg(test)]
pub mod test_utils;
