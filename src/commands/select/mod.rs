mod execute;
mod output;

pub use execute::SelectResult;

use clap::{Args, ValueEnum};

use crate::commands::FilterArgs;
use crate::query::FetchStyle;

/// Row shape for printed results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RowStyle {
    /// Column name → value
    #[default]
    Assoc,
    /// Values by position
    Num,
    /// Values keyed by name and by position
    Both,
    /// A single column (see --column)
    Column,
    /// Rows grouped by their first column
    Group,
}

impl RowStyle {
    pub fn fetch_style(self, column: usize) -> FetchStyle {
        match self {
            RowStyle::Assoc => FetchStyle::Assoc,
            RowStyle::Num => FetchStyle::Num,
            RowStyle::Both => FetchStyle::Both,
            RowStyle::Column => FetchStyle::Column(column),
            RowStyle::Group => FetchStyle::Group,
        }
    }
}

/// Fetch rows from a table
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  fluent_query select -t users                                  # All rows
  fluent_query select -t users -w 'votes > 100' --or-where 'name like T%'
  fluent_query select -t users -c 'team, COUNT(*) AS n' -g team # Grouped
  fluent_query select -t users --join 'posts ON posts.user_id = users.id'
  fluent_query select -t users -o votes:desc -l 10 --offset 20  # Paginated")]
pub struct SelectCmd {
    /// Table to read from
    #[arg(short, long)]
    pub table: String,

    /// Comma-delimited projection
    #[arg(short, long, default_value = "*")]
    pub columns: String,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Inner join, written "TABLE ON CONDITION" (repeatable)
    #[arg(long = "join", value_name = "JOIN")]
    pub joins: Vec<String>,

    /// Left join, written "TABLE ON CONDITION" (repeatable)
    #[arg(long = "left-join", value_name = "JOIN")]
    pub left_joins: Vec<String>,

    /// Sort key "field" or "field:desc" (repeatable)
    #[arg(short, long = "order-by", value_name = "FIELD[:DIR]")]
    pub order_by: Vec<String>,

    /// Group by field (repeatable)
    #[arg(short, long = "group-by", value_name = "FIELD")]
    pub group_by: Vec<String>,

    /// Maximum number of rows
    #[arg(short, long, value_parser = clap::value_parser!(i64).range(0..))]
    pub limit: Option<i64>,

    /// Number of rows to skip
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
    pub offset: Option<i64>,

    /// Row shape
    #[arg(short, long, value_enum, default_value_t = RowStyle::Assoc)]
    pub style: RowStyle,

    /// Column index used by --style column
    #[arg(long, default_value_t = 0)]
    pub column: usize,

    /// Return only the first matching row
    #[arg(long, default_value_t = false)]
    pub first: bool,
}
