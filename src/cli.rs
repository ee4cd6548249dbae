//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use clap::Parser;

use crate::commands::Command;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Database URL or SQLite file path (default: .fluent_query.json, then
    /// DATABASE_URL, then ./fluent_query.sqlite)
    #[arg(short, long, global = true)]
    pub db: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_global_args_default() {
        let args = Args::try_parse_from(["fluent_query", "count", "-t", "users"]).unwrap();
        assert_eq!(args.db, None);
        assert_eq!(args.format, OutputFormat::Table);
    }

    #[rstest]
    #[case("json", OutputFormat::Json)]
    #[case("toon", OutputFormat::Toon)]
    fn test_global_args_after_subcommand(#[case] format: &str, #[case] expected: OutputFormat) {
        let args = Args::try_parse_from([
            "fluent_query",
            "count",
            "-t",
            "users",
            "--db",
            ":memory:",
            "--format",
            format,
        ])
        .unwrap();
        assert_eq!(args.db.as_deref(), Some(":memory:"));
        assert_eq!(args.format, expected);
    }
}
