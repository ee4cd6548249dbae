use std::error::Error;

use super::UpdateCmd;
use crate::commands::{parse_assignment, Execute, MutationResult};
use crate::query::{Db, Operation, Values};

impl Execute for UpdateCmd {
    type Output = MutationResult;

    fn execute(self, db: &Db) -> Result<Self::Output, Box<dyn Error>> {
        let values = self
            .values
            .iter()
            .map(|s| parse_assignment(s))
            .collect::<Result<Values, _>>()?;

        let mut stmt = self.filter.apply(db.table(self.table.as_str()))?;
        if self.all {
            stmt = stmt.unconditional();
        }
        let affected = stmt.update(db, values)?;

        Ok(MutationResult {
            table: self.table,
            operation: Operation::Update.to_string(),
            affected,
        })
    }
}
