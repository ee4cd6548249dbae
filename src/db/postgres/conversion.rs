//! Type conversion utilities for the PostgreSQL backend.
//!
//! Handles conversion between:
//! - `Value` ↔ PostgreSQL wire types (via `ToSql` / typed `try_get`)
//! - `?` / `:name` placeholders ↔ PostgreSQL's native `$n`

use std::error::Error;

use bytes::BytesMut;
use postgres::types::{to_sql_checked, IsNull, ToSql, Type, WrongType};

use crate::db::escape::{replace_placeholders, scan_placeholders, Placeholder};
use crate::db::{DbError, Params, Value};

/// Text-family parameter types. Any value can be sent as its text form.
fn is_text(ty: &Type) -> bool {
    [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME, Type::UNKNOWN].contains(ty)
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) if *ty == Type::BOOL => b.to_sql(ty, out),
            Value::Int(i) if *ty == Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
            Value::Int(i) if *ty == Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
            Value::Int(i) if *ty == Type::INT8 => i.to_sql(ty, out),
            Value::Int(i) if *ty == Type::FLOAT4 => (*i as f32).to_sql(ty, out),
            Value::Int(i) if *ty == Type::FLOAT8 => (*i as f64).to_sql(ty, out),
            Value::Float(f) if *ty == Type::FLOAT4 => (*f as f32).to_sql(ty, out),
            Value::Float(f) if *ty == Type::FLOAT8 => f.to_sql(ty, out),
            Value::Text(s) if is_text(ty) || *ty == Type::JSON => s.to_sql(ty, out),
            Value::Bytes(b) if *ty == Type::BYTEA => b.to_sql(ty, out),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) if is_text(ty) => {
                self.display().to_sql(ty, out)
            }
            _ => Err(Box::new(WrongType::new::<Value>(ty.clone()))),
        }
    }

    // The server decides the parameter type; `to_sql` checks each pairing.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Read column `index` of a row as a `Value`, based on the column type.
pub fn read_value(row: &postgres::Row, index: usize) -> Result<Value, DbError> {
    let column = &row.columns()[index];
    let ty = column.type_();
    let failed = |e: postgres::Error| DbError::QueryFailed {
        message: format!("column '{}': {}", column.name(), e),
    };

    let value = if *ty == Type::BOOL {
        Value::from(row.try_get::<_, Option<bool>>(index).map_err(failed)?)
    } else if *ty == Type::INT2 {
        Value::from(row.try_get::<_, Option<i16>>(index).map_err(failed)?.map(i64::from))
    } else if *ty == Type::INT4 {
        Value::from(row.try_get::<_, Option<i32>>(index).map_err(failed)?.map(i64::from))
    } else if *ty == Type::INT8 {
        Value::from(row.try_get::<_, Option<i64>>(index).map_err(failed)?)
    } else if *ty == Type::OID {
        Value::from(row.try_get::<_, Option<u32>>(index).map_err(failed)?)
    } else if *ty == Type::FLOAT4 {
        Value::from(row.try_get::<_, Option<f32>>(index).map_err(failed)?.map(f64::from))
    } else if *ty == Type::FLOAT8 {
        Value::from(row.try_get::<_, Option<f64>>(index).map_err(failed)?)
    } else if *ty == Type::BYTEA {
        Value::from(row.try_get::<_, Option<Vec<u8>>>(index).map_err(failed)?)
    } else if [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME, Type::UNKNOWN].contains(ty) {
        Value::from(row.try_get::<_, Option<String>>(index).map_err(failed)?)
    } else {
        return Err(DbError::UnsupportedType {
            column: column.name().to_string(),
            type_name: ty.name().to_string(),
        });
    };
    Ok(value)
}

/// Rewrite `?` and `:name` placeholders to `$n` and order the values to match.
///
/// SQL that already uses `$n` (or has no placeholders) passes through with
/// its positional values untouched. Each distinct name is numbered by first
/// appearance, so a name used twice binds once.
pub fn rewrite_placeholders(sql: &str, params: &Params) -> Result<(String, Vec<Value>), DbError> {
    let spans = scan_placeholders(sql);

    match params {
        Params::Positional(values) => {
            if spans.iter().any(|s| matches!(s.placeholder, Placeholder::Named(_))) {
                return Err(DbError::PlaceholderMismatch {
                    message: "named placeholder used with positional parameters".to_string(),
                });
            }
            let sql = replace_placeholders(sql, &spans, |_, n| format!("${}", n + 1));
            Ok((sql, values.clone()))
        }
        Params::Named(_) => {
            if spans.iter().any(|s| s.placeholder == Placeholder::Positional) {
                return Err(DbError::PlaceholderMismatch {
                    message: "positional placeholder used with named parameters".to_string(),
                });
            }
            let mut order: Vec<String> = Vec::new();
            let sql = replace_placeholders(sql, &spans, |span, _| {
                let Placeholder::Named(name) = &span.placeholder else {
                    unreachable!("positional spans rejected above")
                };
                let position = match order.iter().position(|n| n == name) {
                    Some(p) => p,
                    None => {
                        order.push(name.clone());
                        order.len() - 1
                    }
                };
                format!("${}", position + 1)
            });
            let values = order
                .iter()
                .map(|name| {
                    params.get(name).cloned().ok_or_else(|| DbError::MissingParameter {
                        name: name.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok((sql, values))
        }
    }
}

/// Bind compiler output, which already uses `$n` when its params are
/// positional. Only named params need rewriting.
pub fn bind_compiled(sql: &str, params: &Params) -> Result<(String, Vec<Value>), DbError> {
    match params {
        Params::Positional(values) => Ok((sql.to_string(), values.clone())),
        Params::Named(_) => rewrite_placeholders(sql, params),
    }
}
