use std::error::Error;

use serde::Serialize;

use super::RawCmd;
use crate::commands::{parse_assignment, parse_value, Execute};
use crate::db::{Params, Row};
use crate::query::Db;

/// Result of the raw command execution
#[derive(Debug, Clone, Serialize)]
pub struct RawResult {
    pub sql: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected: Option<u64>,
}

impl RawCmd {
    fn params(&self) -> Result<Params, Box<dyn Error>> {
        if !self.named.is_empty() {
            let mut params = Params::named();
            for pair in &self.named {
                let (name, value) = parse_assignment(pair)?;
                params = params.with(name, value);
            }
            return Ok(params);
        }
        Ok(Params::Positional(self.params.iter().map(|p| parse_value(p)).collect()))
    }
}

impl Execute for RawCmd {
    type Output = RawResult;

    fn execute(self, db: &Db) -> Result<Self::Output, Box<dyn Error>> {
        let params = self.params()?;

        if self.execute {
            // Statements that return no rows go straight to the connection.
            let outcome = db.connection().execute(&self.sql, &params)?;
            return Ok(RawResult {
                sql: self.sql,
                rows: None,
                affected: Some(outcome.affected_rows),
            });
        }

        let rows = db.raw_sql(self.sql.as_str(), params).all(db)?;
        Ok(RawResult {
            sql: self.sql,
            rows: Some(rows),
            affected: None,
        })
    }
}
