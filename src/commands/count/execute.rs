use std::error::Error;

use serde::Serialize;

use super::CountCmd;
use crate::commands::Execute;
use crate::query::Db;

/// Result of the count command execution
#[derive(Debug, Clone, Serialize)]
pub struct CountResult {
    pub table: String,
    pub count: i64,
}

impl Execute for CountCmd {
    type Output = CountResult;

    fn execute(self, db: &Db) -> Result<Self::Output, Box<dyn Error>> {
        let mut stmt = self.filter.apply(db.table(self.table.as_str()))?;
        for field in &self.group_by {
            stmt = stmt.group_by(field.as_str());
        }
        let count = stmt.count(db)?;
        Ok(CountResult {
            table: self.table,
            count,
        })
    }
}
