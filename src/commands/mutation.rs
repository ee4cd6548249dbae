//! Result type shared by update and delete.

use serde::Serialize;

use crate::output::Outputable;

/// Rows affected by an UPDATE or DELETE.
#[derive(Debug, Clone, Serialize)]
pub struct MutationResult {
    pub table: String,
    pub operation: String,
    pub affected: u64,
}

impl Outputable for MutationResult {
    fn to_table(&self) -> String {
        format!("{} {}: {} row(s) affected", self.operation, self.table, self.affected)
    }
}
