//! Terminal calls: compile a statement, run it, shape the result.
//!
//! Every terminal consumes its `Statement`. Build errors are returned before
//! the connection is touched; driver errors come back as
//! `QueryError::Execution` carrying the SQL text and parameter count.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::db::{ColumnKey, ExecOutcome, ResultSet, Row, Value};

use super::builder::Statement;
use super::clause::{Operation, Values};
use super::{BuildError, CompiledQuery, Db, QueryError};

/// Row shape returned by `get`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStyle {
    /// Column name → value.
    #[default]
    Assoc,
    /// Values by position.
    Num,
    /// Every value keyed by name and by position.
    Both,
    /// A single column per row.
    Column(usize),
    /// Rows grouped by the value of their first column.
    Group,
}

/// Rows fetched by `get`, in the requested shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Fetched {
    Assoc(Vec<Row>),
    Num(Vec<Vec<Value>>),
    Both(Vec<Vec<(ColumnKey, Value)>>),
    Column(Vec<Value>),
    /// Groups in order of first appearance.
    Group(Vec<(Value, Vec<Row>)>),
}

impl Fetched {
    /// Number of rows, or groups for `Group`.
    pub fn len(&self) -> usize {
        match self {
            Fetched::Assoc(rows) => rows.len(),
            Fetched::Num(rows) => rows.len(),
            Fetched::Both(rows) => rows.len(),
            Fetched::Column(values) => values.len(),
            Fetched::Group(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            Fetched::Assoc(rows) => Some(rows),
            _ => None,
        }
    }
}

/// Result of `insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Inserted {
    /// Id of the new row, from the driver or a `RETURNING` column.
    Id(i64),
    /// The row was written but no id is available.
    Success,
}

impl Inserted {
    pub fn id(self) -> Option<i64> {
        match self {
            Inserted::Id(id) => Some(id),
            Inserted::Success => None,
        }
    }
}

impl Statement {
    /// First matching row, or `None` when nothing matches.
    ///
    /// Adds `LIMIT 1` unless a limit is already set.
    pub fn one(self, db: &Db) -> Result<Option<Row>, QueryError> {
        require_select(&self, "one")?;
        let stmt = if self.limit.is_none() && !self.is_raw() {
            self.limit(1)
        } else {
            self
        };
        let compiled = db.compiler().compile(&stmt)?;
        let result = run_query(db, &compiled)?;
        Ok(into_rows(result).into_iter().next())
    }

    /// All matching rows in the requested shape.
    pub fn get(self, db: &Db, style: FetchStyle) -> Result<Fetched, QueryError> {
        require_select(&self, "get")?;
        let compiled = db.compiler().compile(&self)?;
        let result = run_query(db, &compiled)?;
        shape(result, style)
    }

    /// All matching rows as column → value maps.
    pub fn all(self, db: &Db) -> Result<Vec<Row>, QueryError> {
        require_select(&self, "get")?;
        let compiled = db.compiler().compile(&self)?;
        Ok(into_rows(run_query(db, &compiled)?))
    }

    /// Number of matching rows.
    ///
    /// Raw SQL is run as given and its rows are counted.
    pub fn count(self, db: &Db) -> Result<i64, QueryError> {
        let compiled = db.compiler().compile_count(&self)?;
        let result = run_query(db, &compiled)?;
        if self.is_raw() {
            return Ok(result.rows.len() as i64);
        }
        Ok(result
            .rows
            .first()
            .and_then(|row| row.first())
            .and_then(Value::as_i64)
            .unwrap_or(0))
    }

    /// Insert one row.
    ///
    /// With `returning(col)` the id is read from the returned column;
    /// otherwise the driver's last-insert id is used when it reports one.
    pub fn insert(self, db: &Db, values: impl Into<Values>) -> Result<Inserted, QueryError> {
        let stmt = self.into_insert(values);
        let compiled = db.compiler().compile(&stmt)?;
        if stmt.returning.is_some() {
            let result = run_query(db, &compiled)?;
            return Ok(result
                .rows
                .first()
                .and_then(|row| row.first())
                .and_then(Value::as_i64)
                .map_or(Inserted::Success, Inserted::Id));
        }
        let outcome = run_execute(db, &compiled)?;
        Ok(outcome.last_insert_id.map_or(Inserted::Success, Inserted::Id))
    }

    /// Update matching rows, returning how many were affected.
    pub fn update(self, db: &Db, values: impl Into<Values>) -> Result<u64, QueryError> {
        let stmt = self.into_update(values);
        let compiled = db.compiler().compile(&stmt)?;
        Ok(run_execute(db, &compiled)?.affected_rows)
    }

    /// Delete matching rows, returning how many were affected.
    pub fn delete(self, db: &Db) -> Result<u64, QueryError> {
        let stmt = self.into_delete();
        let compiled = db.compiler().compile(&stmt)?;
        Ok(run_execute(db, &compiled)?.affected_rows)
    }
}

/// Recorded errors come first, then the operation check. Raw SQL skips both
/// since it ignores builder state.
fn require_select(stmt: &Statement, terminal: &'static str) -> Result<(), BuildError> {
    if stmt.is_raw() {
        return Ok(());
    }
    if let Some(err) = stmt.error() {
        return Err(err.clone());
    }
    match stmt.operation() {
        None | Some(Operation::Select) => Ok(()),
        Some(operation) => Err(BuildError::UnsupportedOperation { operation, terminal }),
    }
}

fn run_query(db: &Db, compiled: &CompiledQuery) -> Result<ResultSet, QueryError> {
    let conn = db.connection();
    debug!(
        backend = conn.backend_name(),
        sql = %compiled.sql,
        params = compiled.params.len(),
        "running query"
    );
    let result = if compiled.raw {
        conn.query(&compiled.sql, &compiled.params)
    } else {
        conn.query_compiled(&compiled.sql, &compiled.params)
    }
    .map_err(|source| execution_error(compiled, source))?;
    debug!(rows = result.rows.len(), "query returned");
    Ok(result)
}

fn run_execute(db: &Db, compiled: &CompiledQuery) -> Result<ExecOutcome, QueryError> {
    let conn = db.connection();
    debug!(
        backend = conn.backend_name(),
        sql = %compiled.sql,
        params = compiled.params.len(),
        "executing statement"
    );
    let outcome = if compiled.raw {
        conn.execute(&compiled.sql, &compiled.params)
    } else {
        conn.execute_compiled(&compiled.sql, &compiled.params)
    }
    .map_err(|source| execution_error(compiled, source))?;
    debug!(affected = outcome.affected_rows, "statement executed");
    Ok(outcome)
}

fn execution_error(compiled: &CompiledQuery, source: crate::db::DbError) -> QueryError {
    QueryError::Execution {
        sql: compiled.sql.clone(),
        param_count: compiled.params.len(),
        source,
    }
}

fn into_rows(result: ResultSet) -> Vec<Row> {
    let columns: Arc<[String]> = result.columns.into();
    result
        .rows
        .into_iter()
        .map(|values| Row::new(Arc::clone(&columns), values))
        .collect()
}

fn shape(result: ResultSet, style: FetchStyle) -> Result<Fetched, QueryError> {
    match style {
        FetchStyle::Assoc => Ok(Fetched::Assoc(into_rows(result))),
        FetchStyle::Num => Ok(Fetched::Num(result.rows)),
        FetchStyle::Both => {
            let columns = result.columns;
            let rows = result
                .rows
                .into_iter()
                .map(|values| {
                    let mut entries = Vec::with_capacity(values.len() * 2);
                    for (i, value) in values.into_iter().enumerate() {
                        entries.push((ColumnKey::Name(columns[i].clone()), value.clone()));
                        entries.push((ColumnKey::Index(i), value));
                    }
                    entries
                })
                .collect();
            Ok(Fetched::Both(rows))
        }
        FetchStyle::Column(index) => {
            if index >= result.columns.len() {
                return Err(QueryError::ColumnOutOfRange {
                    index,
                    columns: result.columns.len(),
                });
            }
            let values = result
                .rows
                .into_iter()
                .map(|mut values| values.swap_remove(index))
                .collect();
            Ok(Fetched::Column(values))
        }
        FetchStyle::Group => {
            // Value holds floats, so groups are found by linear search.
            let mut groups: Vec<(Value, Vec<Row>)> = Vec::new();
            for row in into_rows(result) {
                let key = row.get_index(0).cloned().unwrap_or_default();
                match groups.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, rows)) => rows.push(row),
                    None => groups.push((key, vec![row])),
                }
            }
            Ok(Fetched::Group(groups))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Params;
    use crate::query::clause::Direction;
    use crate::test_utils::users_db;
    use rstest::rstest;

    #[test]
    fn test_one_returns_first_row() {
        let db = users_db();
        let row = db.table("users").where_eq("id", 1).one(&db).unwrap().unwrap();
        assert_eq!(row.get("name"), Some(&Value::from("Taylor")));
    }

    #[test]
    fn test_one_zero_rows_is_none() {
        let db = users_db();
        let row = db.table("users").where_eq("id", 5000).one(&db).unwrap();
        assert!(row.is_none());
    }

    #[test]
    fn test_get_assoc_with_or_where() {
        let db = users_db();
        let rows = db
            .table("users")
            .where_op("votes", ">", 100)
            .or_where_op("name", "like", "T%")
            .order_by("id", Direction::Asc)
            .get(&db, FetchStyle::default())
            .unwrap()
            .into_rows()
            .unwrap();
        let names: Vec<&str> = rows.iter().filter_map(|r| r.get("name")?.as_str()).collect();
        assert_eq!(names, vec!["Taylor", "Abigail"]);
    }

    #[rstest]
    #[case(FetchStyle::Num, 3)]
    #[case(FetchStyle::Column(1), 3)]
    #[case(FetchStyle::Group, 2)]
    fn test_get_styles(#[case] style: FetchStyle, #[case] expected_len: usize) {
        let db = users_db();
        let fetched = db
            .table("users")
            .select("team, name")
            .order_by("id", Direction::Asc)
            .get(&db, style)
            .unwrap();
        assert_eq!(fetched.len(), expected_len);
    }

    #[test]
    fn test_get_group_keeps_first_appearance_order() {
        let db = users_db();
        let Fetched::Group(groups) = db
            .table("users")
            .select("team, name")
            .order_by("id", Direction::Asc)
            .get(&db, FetchStyle::Group)
            .unwrap()
        else {
            panic!("Expected grouped rows");
        };
        assert_eq!(groups[0].0, Value::from("red"));
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, Value::from("blue"));
    }

    #[test]
    fn test_get_both_keys_by_name_and_index() {
        let db = users_db();
        let Fetched::Both(rows) = db
            .table("users")
            .select("id")
            .where_eq("id", 2)
            .get(&db, FetchStyle::Both)
            .unwrap()
        else {
            panic!("Expected both-keyed rows");
        };
        assert_eq!(
            rows[0],
            vec![
                (ColumnKey::Name("id".to_string()), Value::Int(2)),
                (ColumnKey::Index(0), Value::Int(2)),
            ]
        );
    }

    #[test]
    fn test_get_column_out_of_range() {
        let db = users_db();
        let err = db.table("users").select("id").get(&db, FetchStyle::Column(3)).unwrap_err();
        assert!(matches!(err, QueryError::ColumnOutOfRange { index: 3, columns: 1 }));
    }

    #[test]
    fn test_count() {
        let db = users_db();
        assert_eq!(db.table("users").count(&db).unwrap(), 3);
        assert_eq!(db.table("users").where_eq("team", "red").count(&db).unwrap(), 2);
        assert_eq!(db.table("users").group_by("team").count(&db).unwrap(), 2);
    }

    #[test]
    fn test_count_matches_distinct_projection() {
        let db = users_db();
        let rows = db.table("users").select("DISTINCT team").all(&db).unwrap();
        let count = db.table("users").select("DISTINCT team").count(&db).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(count, 2);
    }

    /// Records which entry point each call used.
    #[derive(Default)]
    struct Recording {
        calls: std::sync::Mutex<Vec<&'static str>>,
    }

    impl Recording {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl crate::db::Connection for Recording {
        fn query(&self, _sql: &str, _params: &Params) -> Result<ResultSet, crate::db::DbError> {
            self.record("query");
            Ok(ResultSet::default())
        }

        fn execute(&self, _sql: &str, _params: &Params) -> Result<ExecOutcome, crate::db::DbError> {
            self.record("execute");
            Ok(ExecOutcome::default())
        }

        fn query_compiled(&self, _sql: &str, _params: &Params) -> Result<ResultSet, crate::db::DbError> {
            self.record("query_compiled");
            Ok(ResultSet::default())
        }

        fn execute_compiled(&self, _sql: &str, _params: &Params) -> Result<ExecOutcome, crate::db::DbError> {
            self.record("execute_compiled");
            Ok(ExecOutcome::default())
        }

        fn dialect(&self) -> crate::db::Dialect {
            crate::db::Dialect::Postgres
        }

        fn backend_name(&self) -> &'static str {
            "Recording"
        }
    }

    #[test]
    fn test_compiled_and_raw_sql_use_separate_entry_points() {
        let conn = std::sync::Arc::new(Recording::default());
        let db = Db::from_arc(conn.clone());

        db.table("t").where_raw("tags ? 'x'").all(&db).unwrap();
        db.table("t").where_eq("a", 1).delete(&db).unwrap();
        db.raw_sql("SELECT ?", vec![1]).all(&db).unwrap();
        db.raw_sql("DELETE FROM t", Params::new()).delete(&db).unwrap();

        assert_eq!(
            *conn.calls.lock().unwrap(),
            vec!["query_compiled", "execute_compiled", "query", "execute"]
        );
    }

    #[test]
    fn test_raw_sql_ignores_prior_build_errors() {
        let db = users_db();
        let row = db
            .table("users")
            .limit(-1)
            .raw_sql("SELECT COUNT(*) AS n FROM users", Params::new())
            .one(&db)
            .unwrap()
            .unwrap();
        assert_eq!(row.get("n"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_raw_sql_runs_through_mutation_terminals() {
        let db = users_db();
        let deleted = db
            .table("users")
            .select("id")
            .raw_sql("DELETE FROM users WHERE id = ?", vec![1])
            .delete(&db)
            .unwrap();
        assert_eq!(deleted, 1);

        let updated = db
            .raw_sql("UPDATE users SET votes = ? WHERE team = ?", Params::new().bind(0).bind("red"))
            .update(&db, [("ignored", 1)])
            .unwrap();
        assert_eq!(updated, 1);

        let inserted = db
            .table("posts")
            .raw_sql("INSERT INTO users (name) VALUES (?)", vec!["Zed"])
            .insert(&db, Values::new())
            .unwrap();
        assert_eq!(inserted, Inserted::Id(4));
    }

    #[test]
    fn test_count_raw_counts_rows() {
        let db = users_db();
        let count = db
            .raw_sql("SELECT id FROM users WHERE votes > ?", vec![20])
            .count(&db)
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_raw_sql_with_named_params() {
        let db = users_db();
        let row = db
            .table("ignored")
            .where_eq("nope", 1)
            .raw_sql(
                "SELECT COUNT(*) AS n FROM users WHERE votes > :votes",
                Params::named().with(":votes", 18),
            )
            .one(&db)
            .unwrap()
            .unwrap();
        assert_eq!(row.get("n"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_insert_returns_id() {
        let db = users_db();
        let inserted = db
            .table("users")
            .insert(&db, [("name", "John"), ("team", "blue")])
            .unwrap();
        assert_eq!(inserted, Inserted::Id(4));
    }

    #[test]
    fn test_insert_returning_column() {
        let db = users_db();
        let inserted = db
            .table("users")
            .returning("id")
            .insert(&db, [("name", "Jane")])
            .unwrap();
        assert_eq!(inserted.id(), Some(4));
    }

    #[test]
    fn test_update_and_delete_affected_rows() {
        let db = users_db();
        let updated = db
            .table("users")
            .where_eq("team", "red")
            .update(&db, [("votes", 0)])
            .unwrap();
        assert_eq!(updated, 2);

        let deleted = db.table("users").where_op("votes", "=", 0).delete(&db).unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(db.table("users").count(&db).unwrap(), 1);
    }

    #[test]
    fn test_unconditional_delete_needs_marker() {
        let db = users_db();
        let err = db.table("users").delete(&db).unwrap_err();
        assert!(matches!(
            err,
            QueryError::Build(BuildError::UnconditionalMutation { operation: Operation::Delete })
        ));
        assert_eq!(db.table("users").count(&db).unwrap(), 3);
        assert_eq!(db.table("users").unconditional().delete(&db).unwrap(), 3);
    }

    #[test]
    fn test_build_error_before_execution() {
        let db = users_db();
        let err = db.table("users").limit(-1).get(&db, FetchStyle::Assoc).unwrap_err();
        assert!(matches!(err, QueryError::Build(BuildError::NegativeLimit(-1))));
    }

    #[test]
    fn test_execution_error_carries_sql() {
        let db = users_db();
        let err = db.table("missing_table").where_eq("a", "secret").all(&db).unwrap_err();
        let QueryError::Execution { sql, param_count, .. } = err else {
            panic!("Expected execution error");
        };
        assert_eq!(sql, "SELECT * FROM missing_table WHERE a = ?");
        assert_eq!(param_count, 1);
    }

    #[test]
    fn test_get_on_insert_statement_rejected() {
        let db = users_db();
        let err = db
            .table("users")
            .into_insert([("name", "x")])
            .get(&db, FetchStyle::Assoc)
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::Build(BuildError::UnsupportedOperation { terminal: "get", .. })
        ));
    }
}
