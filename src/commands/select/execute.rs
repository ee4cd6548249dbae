use std::error::Error;

use serde::Serialize;

use super::SelectCmd;
use crate::commands::Execute;
use crate::query::{Db, Direction, Fetched, Statement};

/// Result of the select command execution
#[derive(Debug, Clone, Serialize)]
pub struct SelectResult {
    pub table: String,
    pub sql: String,
    pub rows: Fetched,
}

impl SelectCmd {
    /// Build the statement without running it.
    pub fn build(&self, db: &Db) -> Result<Statement, Box<dyn Error>> {
        let mut stmt = db.table(self.table.as_str()).select(&self.columns);
        stmt = self.filter.apply(stmt)?;

        for join in &self.joins {
            let (table, condition) = split_join(join)?;
            stmt = stmt.join_raw(table, condition);
        }
        for join in &self.left_joins {
            let (table, condition) = split_join(join)?;
            stmt = stmt.left_join_raw(table, condition);
        }
        for field in &self.group_by {
            stmt = stmt.group_by(field.as_str());
        }
        for key in &self.order_by {
            let (field, direction) = split_order(key)?;
            stmt = stmt.order_by(field, direction);
        }
        if let Some(limit) = self.limit {
            stmt = stmt.limit(limit);
        } else if self.first {
            stmt = stmt.limit(1);
        }
        if let Some(offset) = self.offset {
            stmt = stmt.offset(offset);
        }
        Ok(stmt)
    }
}

impl Execute for SelectCmd {
    type Output = SelectResult;

    fn execute(self, db: &Db) -> Result<Self::Output, Box<dyn Error>> {
        let stmt = self.build(db)?;
        let sql = db.to_sql(&stmt)?.sql;

        let rows = if self.first {
            Fetched::Assoc(stmt.one(db)?.into_iter().collect())
        } else {
            stmt.get(db, self.style.fetch_style(self.column))?
        };

        Ok(SelectResult {
            table: self.table,
            sql,
            rows,
        })
    }
}

/// Split "TABLE ON CONDITION".
fn split_join(arg: &str) -> Result<(&str, &str), Box<dyn Error>> {
    let lower = arg.to_ascii_lowercase();
    let at = lower
        .find(" on ")
        .ok_or_else(|| format!("Invalid join '{arg}': expected 'TABLE ON CONDITION'"))?;
    let table = arg[..at].trim();
    let condition = arg[at + 4..].trim();
    if table.is_empty() || condition.is_empty() {
        return Err(format!("Invalid join '{arg}': expected 'TABLE ON CONDITION'").into());
    }
    Ok((table, condition))
}

/// Split "field" or "field:dir".
fn split_order(key: &str) -> Result<(&str, Direction), Box<dyn Error>> {
    match key.rsplit_once(':') {
        Some((field, dir)) => Ok((field.trim(), dir.parse::<Direction>()?)),
        None => Ok((key.trim(), Direction::Asc)),
    }
}
