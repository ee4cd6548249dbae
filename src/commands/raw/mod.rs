mod execute;
mod output;

pub use execute::RawResult;

use clap::Args;

/// Run SQL text verbatim
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  fluent_query raw 'SELECT * FROM users WHERE votes > ?' -p 100
  fluent_query raw 'SELECT COUNT(*) FROM users WHERE votes > :votes' -n votes=18
  fluent_query raw 'UPDATE users SET votes = 0' --execute")]
pub struct RawCmd {
    /// SQL text, passed to the database unmodified
    pub sql: String,

    /// Positional parameter for a `?` placeholder (repeatable)
    #[arg(short, long = "param", value_name = "VALUE", conflicts_with = "named")]
    pub params: Vec<String>,

    /// Named parameter "name=value" for a `:name` placeholder (repeatable)
    #[arg(short, long, value_name = "NAME=VALUE")]
    pub named: Vec<String>,

    /// Run as a statement and report affected rows instead of fetching
    #[arg(short, long, default_value_t = false)]
    pub execute: bool,
}
