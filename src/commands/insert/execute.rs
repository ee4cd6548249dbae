use std::error::Error;

use serde::Serialize;

use super::InsertCmd;
use crate::commands::{parse_assignment, Execute};
use crate::query::{Db, Values};

/// Result of the insert command execution
#[derive(Debug, Clone, Serialize)]
pub struct InsertResult {
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Execute for InsertCmd {
    type Output = InsertResult;

    fn execute(self, db: &Db) -> Result<Self::Output, Box<dyn Error>> {
        let values = self
            .values
            .iter()
            .map(|s| parse_assignment(s))
            .collect::<Result<Values, _>>()?;

        let mut stmt = db.table(self.table.as_str());
        if let Some(column) = &self.returning {
            stmt = stmt.returning(column.as_str());
        }
        let inserted = stmt.insert(db, values)?;

        Ok(InsertResult {
            table: self.table,
            id: inserted.id(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    crate::execute_test! {
        test_name: test_insert_returns_id,
        cmd: InsertCmd {
            table: "users".to_string(),
            values: vec!["name=John".to_string(), "email=j@x.com".to_string()],
            returning: None,
        },
        assertions: |result| {
            assert_eq!(result.id, Some(4));
        },
    }

    crate::execute_test! {
        test_name: test_insert_returning,
        cmd: InsertCmd {
            table: "users".to_string(),
            values: vec!["name='Jane'".to_string(), "votes=7".to_string()],
            returning: Some("id".to_string()),
        },
        assertions: |result| {
            assert_eq!(result.id, Some(4));
        },
    }

    #[rstest]
    fn test_insert_bad_assignment() {
        use crate::commands::Execute;
        let db = crate::test_utils::users_db();
        let cmd = InsertCmd {
            table: "users".to_string(),
            values: vec!["name".to_string()],
            returning: None,
        };
        assert!(cmd.execute(&db).is_err());
    }

    crate::execute_empty_db_test! {
        cmd_type: InsertCmd,
        cmd: InsertCmd {
            table: "users".to_string(),
            values: vec!["name=x".to_string()],
            returning: None,
        },
    }
}
