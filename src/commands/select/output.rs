//! Output formatting for select command results.

use super::execute::SelectResult;
use crate::output::{format_fetched, Outputable};

impl Outputable for SelectResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Query: {}", self.sql));
        lines.push(String::new());
        lines.push(format_fetched(&self.rows));

        if !self.rows.is_empty() {
            lines.push(String::new());
            lines.push(format!("{} row(s)", self.rows.len()));
        }

        lines.join("\n")
    }
}
