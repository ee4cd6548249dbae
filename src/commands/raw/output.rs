//! Output formatting for raw command results.

use super::execute::RawResult;
use crate::output::{format_fetched, Outputable};
use crate::query::Fetched;

impl Outputable for RawResult {
    fn to_table(&self) -> String {
        let mut lines = vec![format!("Query: {}", self.sql), String::new()];
        if let Some(rows) = &self.rows {
            lines.push(format_fetched(&Fetched::Assoc(rows.clone())));
        }
        if let Some(affected) = self.affected {
            lines.push(format!("{affected} row(s) affected"));
        }
        lines.join("\n")
    }
}
