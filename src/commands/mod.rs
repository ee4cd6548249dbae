//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - An `Execute` impl that builds a statement and runs it through a `Db`
//! - An `Outputable` impl for its result

mod condition;
mod count;
mod delete;
mod insert;
mod mutation;
mod raw;
mod select;
mod update;

pub use condition::{parse_assignment, parse_condition, parse_value, FilterArgs};
pub use count::{CountCmd, CountResult};
pub use delete::DeleteCmd;
pub use insert::{InsertCmd, InsertResult};
pub use mutation::MutationResult;
pub use raw::{RawCmd, RawResult};
pub use select::{RowStyle, SelectCmd, SelectResult};
pub use update::UpdateCmd;

use clap::Subcommand;
use std::error::Error;

use crate::output::{OutputFormat, Outputable};
use crate::query::Db;

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, db: &Db) -> Result<Self::Output, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch rows from a table
    Select(SelectCmd),

    /// Count matching rows
    Count(CountCmd),

    /// Insert one row and report its id
    Insert(InsertCmd),

    /// Update matching rows
    Update(UpdateCmd),

    /// Delete matching rows
    Delete(DeleteCmd),

    /// Run SQL text verbatim with bound parameters
    Raw(RawCmd),

    /// Catch-all for unknown commands
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, db: &Db, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Select(cmd) => {
                let result = cmd.execute(db)?;
                Ok(result.format(format))
            }
            Command::Count(cmd) => {
                let result = cmd.execute(db)?;
                Ok(result.format(format))
            }
            Command::Insert(cmd) => {
                let result = cmd.execute(db)?;
                Ok(result.format(format))
            }
            Command::Update(cmd) => {
                let result = cmd.execute(db)?;
                Ok(result.format(format))
            }
            Command::Delete(cmd) => {
                let result = cmd.execute(db)?;
                Ok(result.format(format))
            }
            Command::Raw(cmd) => {
                let result = cmd.execute(db)?;
                Ok(result.format(format))
            }
            Command::Unknown(args) => {
                Err(format!("Unknown command: {}", args.first().unwrap_or(&String::new())).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use crate::test_utils::users_db;
    use clap::Parser;
    use rstest::rstest;

    #[rstest]
    fn test_run_formats_output() {
        let db = users_db();
        let args = Args::try_parse_from(["fluent_query", "count", "-t", "users"]).unwrap();
        let output = args.command.run(&db, OutputFormat::Table).unwrap();
        assert_eq!(output, "users: 3 row(s)");
    }

    #[rstest]
    fn test_run_unknown_command() {
        let db = users_db();
        let args = Args::try_parse_from(["fluent_query", "frobnicate"]).unwrap();
        let err = args.command.run(&db, OutputFormat::Json).unwrap_err();
        assert_eq!(err.to_string(), "Unknown command: frobnicate");
    }
}
