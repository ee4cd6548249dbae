use std::error::Error;

use super::DeleteCmd;
use crate::commands::{Execute, MutationResult};
use crate::query::{Db, Operation};

impl Execute for DeleteCmd {
    type Output = MutationResult;

    fn execute(self, db: &Db) -> Result<Self::Output, Box<dyn Error>> {
        let mut stmt = self.filter.apply(db.table(self.table.as_str()))?;
        if self.all {
            stmt = stmt.unconditional();
        }
        let affected = stmt.delete(db)?;

        Ok(MutationResult {
            table: self.table,
            operation: Operation::Delete.to_string(),
            affected,
        })
    }
}
