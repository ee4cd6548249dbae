//! The fluent statement builder.
//!
//! A `Statement` is an owned value threaded through consuming calls
//! (`fn x(mut self, ..) -> Self`), so one logical query has exactly one owner
//! and terminal calls consume it. Argument problems found while chaining are
//! recorded (first one wins) and reported by the compiler, before any
//! connection is touched.

use crate::db::{scan_placeholders, Params, Placeholder, Value};

use super::clause::{
    Condition, Connector, Direction, Filter, GroupItem, Join, JoinCondition, JoinKind, Operation,
    OrderItem, Predicate, Values,
};
use super::BuildError;

/// One SQL statement under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub(crate) operation: Option<Operation>,
    pub(crate) table: Option<String>,
    pub(crate) columns: Vec<String>,
    pub(crate) values: Values,
    pub(crate) joins: Vec<Join>,
    pub(crate) predicates: Vec<Predicate>,
    pub(crate) ordering: Vec<OrderItem>,
    pub(crate) grouping: Vec<GroupItem>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) returning: Option<String>,
    pub(crate) unconditional: bool,
    pub(crate) raw: Option<(String, Params)>,
    pub(crate) error: Option<BuildError>,
}

impl Statement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operation set so far, if any.
    pub fn operation(&self) -> Option<Operation> {
        self.operation
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// First build error recorded while chaining.
    pub fn error(&self) -> Option<&BuildError> {
        self.error.as_ref()
    }

    pub fn is_raw(&self) -> bool {
        self.raw.is_some()
    }

    fn fail(mut self, err: BuildError) -> Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }

    fn set_operation(mut self, operation: Operation) -> Self {
        match self.operation {
            Some(current) if current != operation => self.fail(BuildError::OperationConflict {
                current,
                requested: operation,
            }),
            _ => {
                self.operation = Some(operation);
                self
            }
        }
    }

    // =========================================================================
    // Target and projection
    // =========================================================================

    pub fn table(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if name.trim().is_empty() {
            return self.fail(BuildError::EmptyTable);
        }
        self.table = Some(name.trim().to_string());
        self
    }

    /// Set the projection from a comma-delimited column list.
    ///
    /// Commas inside parentheses (`COALESCE(a, b)`) do not split. Calling
    /// `select` again replaces the projection.
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = split_columns(columns);
        self.set_operation(Operation::Select)
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    fn push_predicate(mut self, connector: Connector, condition: Result<Condition, BuildError>) -> Self {
        match condition {
            Ok(condition) => {
                self.predicates.push(Predicate { connector, condition });
                self
            }
            Err(e) => self.fail(e),
        }
    }

    /// AND a filter onto the predicate tree.
    pub fn filter(self, filter: Filter) -> Self {
        self.push_predicate(Connector::And, filter.into_condition())
    }

    /// OR a filter onto the top level of the predicate tree.
    pub fn or_filter(self, filter: Filter) -> Self {
        self.push_predicate(Connector::Or, filter.into_condition())
    }

    /// `field = value`
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Filter::equals(field, value))
    }

    /// `field <operator> value`
    pub fn where_op(
        self,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.filter(Filter::op(field, operator, value))
    }

    /// A parenthesized AND-group of `(field, operator, value)` triples.
    pub fn where_group<I, F, O, V>(self, triples: I) -> Self
    where
        I: IntoIterator<Item = (F, O, V)>,
        F: Into<String>,
        O: Into<String>,
        V: Into<Value>,
    {
        self.filter(Filter::group(triples))
    }

    pub fn or_where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.or_filter(Filter::equals(field, value))
    }

    pub fn or_where_op(
        self,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.or_filter(Filter::op(field, operator, value))
    }

    pub fn or_where_group<I, F, O, V>(self, triples: I) -> Self
    where
        I: IntoIterator<Item = (F, O, V)>,
        F: Into<String>,
        O: Into<String>,
        V: Into<Value>,
    {
        self.or_filter(Filter::group(triples))
    }

    /// AND a raw SQL fragment. The caller is responsible for its safety.
    pub fn where_raw(self, sql: impl Into<String>) -> Self {
        self.push_predicate(Connector::And, raw_condition(sql.into(), Vec::new()))
    }

    /// AND a raw SQL fragment whose `?` marks bind `params` in order.
    pub fn where_raw_with<I, V>(self, sql: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let params = params.into_iter().map(Into::into).collect();
        self.push_predicate(Connector::And, raw_condition(sql.into(), params))
    }

    pub fn or_where_raw(self, sql: impl Into<String>) -> Self {
        self.push_predicate(Connector::Or, raw_condition(sql.into(), Vec::new()))
    }

    // =========================================================================
    // Joins
    // =========================================================================

    fn push_join(mut self, kind: JoinKind, table: String, condition: Result<JoinCondition, BuildError>) -> Self {
        if table.trim().is_empty() {
            return self.fail(BuildError::EmptyTable);
        }
        match condition {
            Ok(condition) => {
                self.joins.push(Join { kind, table, condition });
                self
            }
            Err(e) => self.fail(e),
        }
    }

    /// `INNER JOIN table ON left <operator> right`
    pub fn join(self, table: impl Into<String>, left: &str, operator: &str, right: &str) -> Self {
        self.push_join(JoinKind::Inner, table.into(), on(left, operator, right))
    }

    pub fn left_join(self, table: impl Into<String>, left: &str, operator: &str, right: &str) -> Self {
        self.push_join(JoinKind::Left, table.into(), on(left, operator, right))
    }

    pub fn right_join(self, table: impl Into<String>, left: &str, operator: &str, right: &str) -> Self {
        self.push_join(JoinKind::Right, table.into(), on(left, operator, right))
    }

    /// `INNER JOIN table ON <condition>` with a free-form condition.
    pub fn join_raw(self, table: impl Into<String>, condition: impl Into<String>) -> Self {
        self.push_join(JoinKind::Inner, table.into(), raw_join(condition.into()))
    }

    pub fn left_join_raw(self, table: impl Into<String>, condition: impl Into<String>) -> Self {
        self.push_join(JoinKind::Left, table.into(), raw_join(condition.into()))
    }

    pub fn right_join_raw(self, table: impl Into<String>, condition: impl Into<String>) -> Self {
        self.push_join(JoinKind::Right, table.into(), raw_join(condition.into()))
    }

    // =========================================================================
    // Grouping, ordering, pagination
    // =========================================================================

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.ordering.push(OrderItem::Column {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn order_by_raw(mut self, clause: impl Into<String>) -> Self {
        let clause = clause.into();
        if clause.trim().is_empty() {
            return self.fail(BuildError::EmptyRawFragment);
        }
        self.ordering.push(OrderItem::Raw(clause));
        self
    }

    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.grouping.push(GroupItem::Column(field.into()));
        self
    }

    pub fn group_by_raw(mut self, clause: impl Into<String>) -> Self {
        let clause = clause.into();
        if clause.trim().is_empty() {
            return self.fail(BuildError::EmptyRawFragment);
        }
        self.grouping.push(GroupItem::Raw(clause));
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        match u64::try_from(n) {
            Ok(n) => {
                self.limit = Some(n);
                self
            }
            Err(_) => self.fail(BuildError::NegativeLimit(n)),
        }
    }

    pub fn offset(mut self, n: i64) -> Self {
        match u64::try_from(n) {
            Ok(n) => {
                self.offset = Some(n);
                self
            }
            Err(_) => self.fail(BuildError::NegativeOffset(n)),
        }
    }

    // =========================================================================
    // Mutation settings
    // =========================================================================

    /// Return this column from INSERT as the new row id.
    pub fn returning(mut self, column: impl Into<String>) -> Self {
        self.returning = Some(column.into());
        self
    }

    /// Allow UPDATE or DELETE without any predicate.
    ///
    /// Without this marker a predicate-less mutation is a build error.
    pub fn unconditional(mut self) -> Self {
        self.unconditional = true;
        self
    }

    /// Turn the statement into an INSERT of `values` without executing it.
    ///
    /// The `into_*` conversions leave raw statements untouched.
    pub fn into_insert(mut self, values: impl Into<Values>) -> Self {
        if self.is_raw() {
            return self;
        }
        self.values = values.into();
        self.set_operation(Operation::Insert)
    }

    /// Turn the statement into an UPDATE setting `values` without executing it.
    pub fn into_update(mut self, values: impl Into<Values>) -> Self {
        if self.is_raw() {
            return self;
        }
        self.values = values.into();
        self.set_operation(Operation::Update)
    }

    /// Turn the statement into a DELETE without executing it.
    pub fn into_delete(self) -> Self {
        if self.is_raw() {
            return self;
        }
        self.set_operation(Operation::Delete)
    }

    /// Replace the whole statement with caller-supplied SQL.
    ///
    /// Clauses and build errors accumulated before this call are discarded.
    /// Calls made after it are ignored at compile time; the text and params
    /// go to the connection unmodified.
    pub fn raw_sql(self, sql: impl Into<String>, params: impl Into<Params>) -> Self {
        let sql = sql.into();
        if sql.trim().is_empty() {
            return self.fail(BuildError::EmptyRawFragment);
        }
        Statement {
            raw: Some((sql, params.into())),
            ..Statement::default()
        }
    }
}

fn on(left: &str, operator: &str, right: &str) -> Result<JoinCondition, BuildError> {
    Ok(JoinCondition::On {
        left: left.to_string(),
        operator: operator.parse()?,
        right: right.to_string(),
    })
}

fn raw_join(condition: String) -> Result<JoinCondition, BuildError> {
    if condition.trim().is_empty() {
        return Err(BuildError::EmptyRawFragment);
    }
    Ok(JoinCondition::Raw(condition))
}

fn raw_condition(sql: String, params: Vec<Value>) -> Result<Condition, BuildError> {
    if sql.trim().is_empty() {
        return Err(BuildError::EmptyRawFragment);
    }
    if !params.is_empty() {
        let spans = scan_placeholders(&sql);
        if spans.iter().any(|s| matches!(s.placeholder, Placeholder::Named(_))) {
            return Err(BuildError::NamedRawPlaceholder(sql));
        }
        if spans.len() != params.len() {
            return Err(BuildError::RawParamMismatch {
                placeholders: spans.len(),
                params: params.len(),
            });
        }
    }
    Ok(Condition::Raw { sql, params })
}

/// Split a projection on commas that are not nested in parentheses.
fn split_columns(columns: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in columns.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
