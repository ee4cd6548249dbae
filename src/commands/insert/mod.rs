mod execute;
mod output;

pub use execute::InsertResult;

use clap::Args;

/// Insert one row
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  fluent_query insert -t users -s name=John -s email=j@x.com
  fluent_query insert -t users -s name=John --returning id   # PostgreSQL")]
pub struct InsertCmd {
    /// Table to insert into
    #[arg(short, long)]
    pub table: String,

    /// Column value "column=value" (repeatable)
    #[arg(short, long = "set", value_name = "COLUMN=VALUE", required = true)]
    pub values: Vec<String>,

    /// Column to return as the new row id
    #[arg(long)]
    pub returning: Option<String>,
}
