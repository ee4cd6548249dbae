mod cli_tests;
mod execute;

use clap::Args;

use crate::commands::FilterArgs;

/// Delete matching rows
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  fluent_query delete -t users -w 'votes < 10'
  fluent_query delete -t users --all               # Every row")]
pub struct DeleteCmd {
    /// Table to delete from
    #[arg(short, long)]
    pub table: String,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Allow deleting every row when no condition is given
    #[arg(long, default_value_t = false)]
    pub all: bool,
}
