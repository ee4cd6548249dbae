//! Clause model: the typed intermediate representation of a statement.
//!
//! Pure data. Validation happens when nodes are constructed (operators are a
//! closed set), so the compiler never has to reject a node it is handed.

use std::fmt;
use std::str::FromStr;

use crate::db::Value;

use super::BuildError;

/// Statement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Select => "SELECT",
            Operation::Insert => "INSERT",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Comparison operator of a predicate or join condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    /// `<>`, kept distinct from `!=` so SQL echoes what the caller wrote.
    LtGt,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    NotLike,
    ILike,
}

impl Operator {
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::LtGt => "<>",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::ILike => "ILIKE",
        }
    }
}

impl FromStr for Operator {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_uppercase();
        match normalized.as_str() {
            "=" | "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::NotEq),
            "<>" => Ok(Operator::LtGt),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::LtEq),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::GtEq),
            "LIKE" => Ok(Operator::Like),
            "NOT LIKE" => Ok(Operator::NotLike),
            "ILIKE" => Ok(Operator::ILike),
            _ => Err(BuildError::InvalidOperator(s.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// How a predicate attaches to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    pub fn as_sql(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

/// One node of the predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        field: String,
        operator: Operator,
        value: Value,
    },
    /// Caller-supplied SQL. `?` marks in `sql` bind `params` in order.
    Raw { sql: String, params: Vec<Value> },
    Group(Vec<Predicate>),
}

/// A condition plus the connector joining it to its left sibling.
///
/// The connector of the first predicate in a list is never rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub connector: Connector,
    pub condition: Condition,
}

/// The closed set of `where` call shapes.
///
/// - `Filter::equals(field, value)`: `field = value`
/// - `Filter::op(field, operator, value)`
/// - `Filter::group([(field, operator, value), ...])`: AND-combined triples
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equals { field: String, value: Value },
    Op { field: String, operator: String, value: Value },
    Group(Vec<(String, String, Value)>),
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn op(field: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Op {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    pub fn group<I, F, O, V>(triples: I) -> Self
    where
        I: IntoIterator<Item = (F, O, V)>,
        F: Into<String>,
        O: Into<String>,
        V: Into<Value>,
    {
        Filter::Group(
            triples
                .into_iter()
                .map(|(f, o, v)| (f.into(), o.into(), v.into()))
                .collect(),
        )
    }

    /// Lower into a predicate-tree condition, validating operators.
    pub fn into_condition(self) -> Result<Condition, BuildError> {
        match self {
            Filter::Equals { field, value } => Ok(Condition::Compare {
                field,
                operator: Operator::Eq,
                value,
            }),
            Filter::Op { field, operator, value } => Ok(Condition::Compare {
                field,
                operator: operator.parse()?,
                value,
            }),
            Filter::Group(triples) => {
                if triples.is_empty() {
                    return Err(BuildError::EmptyGroup);
                }
                let predicates = triples
                    .into_iter()
                    .map(|(field, operator, value)| {
                        Ok(Predicate {
                            connector: Connector::And,
                            condition: Condition::Compare {
                                field,
                                operator: operator.parse()?,
                                value,
                            },
                        })
                    })
                    .collect::<Result<Vec<_>, BuildError>>()?;
                Ok(Condition::Group(predicates))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

/// The two historical join conventions: a structured
/// `(left, operator, right)` triple or a free-form condition string.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    On {
        left: String,
        operator: Operator,
        right: String,
    },
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub condition: JoinCondition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            other => Err(format!("invalid sort direction '{other}' (expected asc or desc)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderItem {
    Column { field: String, direction: Direction },
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupItem {
    Column(String),
    Raw(String),
}

/// Column → value assignments for INSERT and UPDATE.
///
/// Keeps insertion order (the order columns appear in generated SQL) and
/// unique keys: setting an existing column replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values {
    entries: Vec<(String, Value)>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Values {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Values::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Values {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for Values {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("=", Operator::Eq)]
    #[case("like", Operator::Like)]
    #[case("not  like", Operator::NotLike)]
    #[case("ILIKE", Operator::ILike)]
    #[case("<>", Operator::LtGt)]
    #[case(">=", Operator::GtEq)]
    fn test_operator_parse(#[case] input: &str, #[case] expected: Operator) {
        assert_eq!(input.parse::<Operator>().unwrap(), expected);
    }

    #[rstest]
    #[case("; DROP TABLE users")]
    #[case("")]
    #[case("IN")]
    fn test_operator_rejects_unknown(#[case] input: &str) {
        let err = input.parse::<Operator>().unwrap_err();
        assert_eq!(err, BuildError::InvalidOperator(input.to_string()));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("DESC".parse::<Direction>().unwrap(), Direction::Desc);
        assert_eq!("asc".parse::<Direction>().unwrap(), Direction::Asc);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_filter_equals_implies_eq_operator() {
        let condition = Filter::equals("id", 5).into_condition().unwrap();
        assert_eq!(
            condition,
            Condition::Compare {
                field: "id".to_string(),
                operator: Operator::Eq,
                value: Value::Int(5),
            }
        );
    }

    #[test]
    fn test_filter_group_is_and_group() {
        let condition = Filter::group([("a", "=", 1), ("b", ">", 2)]).into_condition().unwrap();
        let Condition::Group(children) = condition else {
            panic!("Expected group");
        };
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|p| p.connector == Connector::And));
    }

    #[test]
    fn test_filter_group_empty_is_error() {
        let empty: Vec<(&str, &str, i64)> = vec![];
        assert_eq!(Filter::group(empty).into_condition().unwrap_err(), BuildError::EmptyGroup);
    }

    #[test]
    fn test_filter_group_invalid_operator() {
        let err = Filter::group([("a", "=", 1), ("b", "~~", 2)]).into_condition().unwrap_err();
        assert_eq!(err, BuildError::InvalidOperator("~~".to_string()));
    }

    #[test]
    fn test_values_keep_insertion_order_and_unique_keys() {
        let values = Values::new().set("name", "John").set("email", "j@x.com").set("name", "Jane");
        let columns: Vec<&str> = values.iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["name", "email"]);
        assert_eq!(values.iter().next().unwrap().1, &Value::from("Jane"));
    }
}
