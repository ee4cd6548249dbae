mod cli_tests;
mod execute;
mod output;

pub use execute::CountResult;

use clap::Args;

use crate::commands::FilterArgs;

/// Count matching rows
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  fluent_query count -t users                      # All rows
  fluent_query count -t users -w 'team = red'      # Filtered
  fluent_query count -t users -g team              # Number of teams")]
pub struct CountCmd {
    /// Table to count rows in
    #[arg(short, long)]
    pub table: String,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Count groups instead of rows (repeatable)
    #[arg(short, long = "group-by", value_name = "FIELD")]
    pub group_by: Vec<String>,
}
