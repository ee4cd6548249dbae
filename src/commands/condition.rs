//! Parsing of command-line conditions, assignments and literal values.
//!
//! Conditions look like `votes > 100` or `name not like 'T%'`; assignments
//! look like `email=j@x.com`. Values are read as null, bool, int, float or
//! text, in that order. Quoting a value forces text.

use std::error::Error;

use clap::Args;

use crate::db::Value;
use crate::query::{Operator, Statement};

/// Predicate options shared by select, count, update and delete.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct FilterArgs {
    /// Condition "field op value", AND-combined (repeatable)
    #[arg(short = 'w', long = "where", value_name = "CONDITION")]
    pub conditions: Vec<String>,

    /// Condition "field op value", OR-attached at the top level (repeatable)
    #[arg(long = "or-where", value_name = "CONDITION")]
    pub or_conditions: Vec<String>,

    /// Raw SQL condition, inserted verbatim and AND-combined (repeatable)
    #[arg(long = "where-raw", value_name = "SQL")]
    pub raw: Vec<String>,
}

impl FilterArgs {
    /// Append every condition to `stmt`: AND conditions, then raw ones, then
    /// OR conditions.
    pub fn apply(&self, mut stmt: Statement) -> Result<Statement, Box<dyn Error>> {
        for condition in &self.conditions {
            let (field, operator, value) = parse_condition(condition)?;
            stmt = stmt.where_op(field, operator, value);
        }
        for raw in &self.raw {
            stmt = stmt.where_raw(raw.as_str());
        }
        for condition in &self.or_conditions {
            let (field, operator, value) = parse_condition(condition)?;
            stmt = stmt.or_where_op(field, operator, value);
        }
        Ok(stmt)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.or_conditions.is_empty() && self.raw.is_empty()
    }
}

/// Split `field op value` into its parts.
///
/// The operator may be two words (`not like`). The value is everything
/// after the operator.
pub fn parse_condition(input: &str) -> Result<(String, String, Value), Box<dyn Error>> {
    let input = input.trim();
    let (field, rest) = input
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("Invalid condition '{input}': expected 'field op value'"))?;
    let rest = rest.trim_start();

    let mut words = rest.splitn(3, char::is_whitespace);
    let first = words.next().unwrap_or_default();
    let second = words.next().unwrap_or_default();

    let two_word = format!("{first} {second}");
    let (operator, value) = if !second.is_empty() && two_word.parse::<Operator>().is_ok() {
        (two_word, words.next().unwrap_or_default().trim())
    } else {
        let value = rest[first.len()..].trim();
        (first.to_string(), value)
    };

    operator
        .parse::<Operator>()
        .map_err(|e| format!("Invalid condition '{input}': {e}"))?;
    if value.is_empty() {
        return Err(format!("Invalid condition '{input}': missing value").into());
    }
    Ok((field.to_string(), operator, parse_value(value)))
}

/// Split `column=value`.
pub fn parse_assignment(input: &str) -> Result<(String, Value), Box<dyn Error>> {
    let (column, value) = input
        .split_once('=')
        .ok_or_else(|| format!("Invalid assignment '{input}': expected 'column=value'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("Invalid assignment '{input}': empty column").into());
    }
    Ok((column.to_string(), parse_value(value.trim())))
}

/// Read a literal value.
pub fn parse_value(input: &str) -> Value {
    let trimmed = input.trim();
    for quote in ['\'', '"'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return Value::Text(trimmed[1..trimmed.len() - 1].to_string());
        }
    }
    if trimmed.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return Value::Float(f);
        }
    }
    Value::Text(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("null", Value::Null)]
    #[case("TRUE", Value::Bool(true))]
    #[case("42", Value::Int(42))]
    #[case("-7", Value::Int(-7))]
    #[case("2.5", Value::Float(2.5))]
    #[case("'42'", Value::Text("42".to_string()))]
    #[case("\"a b\"", Value::Text("a b".to_string()))]
    #[case("T%", Value::Text("T%".to_string()))]
    #[case("inf", Value::Text("inf".to_string()))]
    fn test_parse_value(#[case] input: &str, #[case] expected: Value) {
        assert_eq!(parse_value(input), expected);
    }

    #[rstest]
    #[case("votes > 100", "votes", ">", Value::Int(100))]
    #[case("name like T%", "name", "like", Value::from("T%"))]
    #[case("name not like 'T%'", "name", "not like", Value::from("T%"))]
    #[case("email = 'a b c'", "email", "=", Value::from("a b c"))]
    #[case("  id   =   5 ", "id", "=", Value::Int(5))]
    fn test_parse_condition(
        #[case] input: &str,
        #[case] field: &str,
        #[case] operator: &str,
        #[case] value: Value,
    ) {
        let parsed = parse_condition(input).unwrap();
        assert_eq!(parsed, (field.to_string(), operator.to_string(), value));
    }

    #[rstest]
    #[case("votes")]
    #[case("votes >")]
    #[case("votes ~ 3")]
    fn test_parse_condition_rejects(#[case] input: &str) {
        assert!(parse_condition(input).is_err());
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("email=j@x.com").unwrap(),
            ("email".to_string(), Value::from("j@x.com"))
        );
        assert_eq!(parse_assignment("votes = 3").unwrap(), ("votes".to_string(), Value::Int(3)));
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=1").is_err());
    }

    #[test]
    fn test_filter_args_apply_order() {
        let args = FilterArgs {
            conditions: vec!["a = 1".to_string()],
            or_conditions: vec!["b = 2".to_string()],
            raw: vec!["c IS NULL".to_string()],
        };
        let stmt = args.apply(Statement::new().table("t")).unwrap();
        let compiled = crate::query::Compiler::new().compile(&stmt).unwrap();
        assert_eq!(compiled.sql, "SELECT * FROM t WHERE a = ? AND c IS NULL OR b = ?");
    }
}
