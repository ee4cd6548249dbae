//! Output formatting for insert command results.

use super::execute::InsertResult;
use crate::output::Outputable;

impl Outputable for InsertResult {
    fn to_table(&self) -> String {
        match self.id {
            Some(id) => format!("Inserted into {} (id {})", self.table, id),
            None => format!("Inserted into {}", self.table),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn with_id() -> InsertResult {
        InsertResult {
            table: "users".to_string(),
            id: Some(4),
        }
    }

    #[fixture]
    fn without_id() -> InsertResult {
        InsertResult {
            table: "users".to_string(),
            id: None,
        }
    }

    crate::output_table_test! {
        test_name: test_to_table_with_id,
        fixture: with_id,
        fixture_type: InsertResult,
        expected: "Inserted into users (id 4)",
    }

    crate::output_table_test! {
        test_name: test_to_table_without_id,
        fixture: without_id,
        fixture_type: InsertResult,
        expected: "Inserted into users",
    }

    crate::output_json_test! {
        test_name: test_format_json,
        fixture: with_id,
        fixture_type: InsertResult,
        assertions: {
            "table": "users",
            "id": 4,
        },
    }
}
