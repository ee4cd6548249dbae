mod execute;

use clap::Args;

use crate::commands::FilterArgs;

/// Update matching rows
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  fluent_query update -t users -s votes=0 -w 'team = red'
  fluent_query update -t users -s votes=0 --all     # Every row")]
pub struct UpdateCmd {
    /// Table to update
    #[arg(short, long)]
    pub table: String,

    /// Assignment "column=value" (repeatable)
    #[arg(short, long = "set", value_name = "COLUMN=VALUE", required = true)]
    pub values: Vec<String>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Allow updating every row when no condition is given
    #[arg(long, default_value_t = false)]
    pub all: bool,
}
