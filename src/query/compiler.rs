//! Statement → SQL text plus parameters.
//!
//! Pure: no I/O and no state beyond configuration, so one compiler can be
//! shared across threads. Clauses are always emitted in SQL's fixed order,
//! whatever order the builder calls were made in.

use crate::db::{replace_placeholders, scan_placeholders, Dialect, QuoteStyle};

use super::builder::Statement;
use super::clause::{Condition, GroupItem, JoinCondition, Operation, OrderItem, Predicate};
use super::params::{ParamBuilder, PlaceholderStyle};
use super::{BuildError, CompiledQuery};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Compiler {
    placeholders: PlaceholderStyle,
    quote: QuoteStyle,
    dialect: Dialect,
}

impl Compiler {
    /// `?` placeholders, unquoted identifiers, generic dialect.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults matching a connection dialect.
    pub fn for_dialect(dialect: Dialect) -> Self {
        let placeholders = match dialect {
            Dialect::Postgres => PlaceholderStyle::Dollar,
            Dialect::Sqlite | Dialect::Generic => PlaceholderStyle::Question,
        };
        Self {
            placeholders,
            quote: QuoteStyle::None,
            dialect,
        }
    }

    pub fn with_placeholders(mut self, style: PlaceholderStyle) -> Self {
        self.placeholders = style;
        self
    }

    pub fn with_quote(mut self, quote: QuoteStyle) -> Self {
        self.quote = quote;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn placeholder_style(&self) -> PlaceholderStyle {
        self.placeholders
    }

    /// Compile a statement.
    ///
    /// Raw SQL is returned verbatim. A statement with no operation set
    /// compiles as SELECT.
    pub fn compile(&self, stmt: &Statement) -> Result<CompiledQuery, BuildError> {
        if let Some((sql, params)) = &stmt.raw {
            return Ok(CompiledQuery::raw(sql.clone(), params.clone()));
        }
        if let Some(err) = stmt.error() {
            return Err(err.clone());
        }

        let table = stmt.table.as_deref().ok_or(BuildError::MissingTable)?;
        let mut render = Render::new(self);
        let sql = match stmt.operation.unwrap_or(Operation::Select) {
            Operation::Select => render.select(stmt, table),
            Operation::Insert => render.insert(stmt, table)?,
            Operation::Update => render.update(stmt, table)?,
            Operation::Delete => render.delete(stmt, table)?,
        };
        Ok(render.finish(sql))
    }

    /// Compile a row-count query for a SELECT statement.
    ///
    /// Emits `SELECT COUNT(*) AS aggregate FROM ...`. When the statement
    /// projects columns, groups or paginates, the SELECT is wrapped as a
    /// subquery so the count matches the rows `get` would return. Raw SQL is
    /// returned verbatim.
    pub fn compile_count(&self, stmt: &Statement) -> Result<CompiledQuery, BuildError> {
        if stmt.raw.is_some() {
            return self.compile(stmt);
        }
        if let Some(err) = stmt.error() {
            return Err(err.clone());
        }
        match stmt.operation {
            None | Some(Operation::Select) => {}
            Some(operation) => {
                return Err(BuildError::UnsupportedOperation {
                    operation,
                    terminal: "count",
                });
            }
        }

        let table = stmt.table.as_deref().ok_or(BuildError::MissingTable)?;
        let mut render = Render::new(self);
        let paginated = stmt.limit.is_some() || stmt.offset.is_some();
        // A projection can change the row count (DISTINCT, aggregates).
        let projected = stmt.columns.iter().any(|c| c != "*");
        let sql = if !stmt.grouping.is_empty() || paginated || projected {
            let inner = render.select(stmt, table);
            format!("SELECT COUNT(*) AS aggregate FROM ({inner}) AS aggregate_source")
        } else {
            let mut sql = format!("SELECT COUNT(*) AS aggregate FROM {}", self.quote.quote(table));
            render.joins(stmt, &mut sql);
            render.where_clause(&stmt.predicates, &mut sql);
            sql
        };
        Ok(render.finish(sql))
    }
}

/// One compilation pass. Parameters are collected in the order their
/// placeholders appear in the emitted text.
struct Render<'c> {
    compiler: &'c Compiler,
    params: ParamBuilder,
}

impl<'c> Render<'c> {
    fn new(compiler: &'c Compiler) -> Self {
        Self {
            compiler,
            params: ParamBuilder::new(compiler.placeholders),
        }
    }

    fn finish(self, sql: String) -> CompiledQuery {
        CompiledQuery {
            sql,
            params: self.params.build(),
            raw: false,
        }
    }

    fn q(&self, expr: &str) -> String {
        self.compiler.quote.quote(expr)
    }

    fn select(&mut self, stmt: &Statement, table: &str) -> String {
        let columns = if stmt.columns.is_empty() {
            "*".to_string()
        } else {
            stmt.columns.iter().map(|c| self.q(c)).collect::<Vec<_>>().join(", ")
        };

        let mut sql = format!("SELECT {columns} FROM {}", self.q(table));
        self.joins(stmt, &mut sql);
        self.where_clause(&stmt.predicates, &mut sql);

        if !stmt.grouping.is_empty() {
            let items: Vec<String> = stmt
                .grouping
                .iter()
                .map(|g| match g {
                    GroupItem::Column(field) => self.q(field),
                    GroupItem::Raw(clause) => clause.clone(),
                })
                .collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&items.join(", "));
        }

        if !stmt.ordering.is_empty() {
            let items: Vec<String> = stmt
                .ordering
                .iter()
                .map(|o| match o {
                    OrderItem::Column { field, direction } => {
                        format!("{} {}", self.q(field), direction.as_sql())
                    }
                    OrderItem::Raw(clause) => clause.clone(),
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&items.join(", "));
        }

        match (stmt.limit, stmt.offset) {
            (Some(limit), offset) => {
                sql.push_str(&format!(" LIMIT {limit}"));
                if let Some(offset) = offset {
                    sql.push_str(&format!(" OFFSET {offset}"));
                }
            }
            // SQLite only accepts OFFSET after a LIMIT; -1 means no limit.
            (None, Some(offset)) if self.compiler.dialect == Dialect::Sqlite => {
                sql.push_str(&format!(" LIMIT -1 OFFSET {offset}"));
            }
            (None, Some(offset)) => sql.push_str(&format!(" OFFSET {offset}")),
            (None, None) => {}
        }

        sql
    }

    fn insert(&mut self, stmt: &Statement, table: &str) -> Result<String, BuildError> {
        if stmt.values.is_empty() {
            return Err(BuildError::EmptyValues {
                operation: Operation::Insert,
            });
        }
        let mut columns = Vec::with_capacity(stmt.values.len());
        let mut placeholders = Vec::with_capacity(stmt.values.len());
        for (column, value) in stmt.values.iter() {
            columns.push(self.q(column));
            placeholders.push(self.params.push(value.clone()));
        }
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.q(table),
            columns.join(", "),
            placeholders.join(", ")
        );
        if let Some(returning) = &stmt.returning {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.q(returning));
        }
        Ok(sql)
    }

    fn update(&mut self, stmt: &Statement, table: &str) -> Result<String, BuildError> {
        if stmt.values.is_empty() {
            return Err(BuildError::EmptyValues {
                operation: Operation::Update,
            });
        }
        require_predicate(stmt, Operation::Update)?;
        let mut assignments = Vec::with_capacity(stmt.values.len());
        for (column, value) in stmt.values.iter() {
            let column = self.q(column);
            let placeholder = self.params.push(value.clone());
            assignments.push(format!("{column} = {placeholder}"));
        }
        let mut sql = format!("UPDATE {} SET {}", self.q(table), assignments.join(", "));
        self.where_clause(&stmt.predicates, &mut sql);
        Ok(sql)
    }

    fn delete(&mut self, stmt: &Statement, table: &str) -> Result<String, BuildError> {
        require_predicate(stmt, Operation::Delete)?;
        let mut sql = format!("DELETE FROM {}", self.q(table));
        self.where_clause(&stmt.predicates, &mut sql);
        Ok(sql)
    }

    fn joins(&self, stmt: &Statement, sql: &mut String) {
        for join in &stmt.joins {
            let condition = match &join.condition {
                JoinCondition::On { left, operator, right } => {
                    format!("{} {} {}", self.q(left), operator.as_sql(), self.q(right))
                }
                JoinCondition::Raw(condition) => condition.clone(),
            };
            sql.push_str(&format!(" {} {} ON {}", join.kind.as_sql(), self.q(&join.table), condition));
        }
    }

    fn where_clause(&mut self, predicates: &[Predicate], sql: &mut String) {
        if predicates.is_empty() {
            return;
        }
        sql.push_str(" WHERE ");
        let rendered = self.predicates(predicates);
        sql.push_str(&rendered);
    }

    fn predicates(&mut self, predicates: &[Predicate]) -> String {
        let mut out = String::new();
        for (i, predicate) in predicates.iter().enumerate() {
            if i > 0 {
                out.push(' ');
                out.push_str(predicate.connector.as_sql());
                out.push(' ');
            }
            let condition = self.condition(&predicate.condition);
            out.push_str(&condition);
        }
        out
    }

    fn condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Compare { field, operator, value } => {
                let field = self.q(field);
                let placeholder = self.params.push(value.clone());
                format!("{field} {} {placeholder}", operator.as_sql())
            }
            Condition::Raw { sql, params } if params.is_empty() => sql.clone(),
            Condition::Raw { sql, params } => {
                let spans = scan_placeholders(sql);
                let builder = &mut self.params;
                replace_placeholders(sql, &spans, |_, ordinal| {
                    builder.push(params.get(ordinal).cloned().unwrap_or_default())
                })
            }
            Condition::Group(children) if children.len() > 1 => {
                format!("({})", self.predicates(children))
            }
            Condition::Group(children) => self.predicates(children),
        }
    }
}

fn require_predicate(stmt: &Statement, operation: Operation) -> Result<(), BuildError> {
    if stmt.predicates.is_empty() && !stmt.unconditional {
        return Err(BuildError::UnconditionalMutation { operation });
    }
    Ok(())
}
