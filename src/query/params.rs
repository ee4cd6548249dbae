//! Parameter collection during compilation.
//!
//! Every bound value goes through a `ParamBuilder`, which hands back the
//! placeholder text to splice into the SQL. Values are never rendered into
//! the SQL itself.

use crate::db::{Params, Value};

/// Placeholder syntax emitted by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// `?` (SQLite, MySQL, ODBC)
    #[default]
    Question,
    /// `$1`, `$2`, ... (PostgreSQL)
    Dollar,
    /// `:p1`, `:p2`, ... (named; produces `Params::Named`)
    Named,
}

impl PlaceholderStyle {
    /// Placeholder for the `n`th (1-based) parameter.
    pub fn placeholder(self, n: usize) -> String {
        match self {
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::Dollar => format!("${n}"),
            PlaceholderStyle::Named => format!(":p{n}"),
        }
    }
}

/// Helper for building query parameters in placeholder order.
#[derive(Debug, Clone)]
pub struct ParamBuilder {
    style: PlaceholderStyle,
    values: Vec<Value>,
}

impl ParamBuilder {
    /// Create a new, empty parameter builder.
    pub fn new(style: PlaceholderStyle) -> Self {
        Self {
            style,
            values: Vec::new(),
        }
    }

    /// Add a parameter and return its placeholder.
    pub fn push(&mut self, value: Value) -> String {
        self.values.push(value);
        self.style.placeholder(self.values.len())
    }

    /// Build the final `Params`.
    pub fn build(self) -> Params {
        match self.style {
            PlaceholderStyle::Named => Params::Named(
                self.values
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (format!("p{}", i + 1), v))
                    .collect(),
            ),
            PlaceholderStyle::Question | PlaceholderStyle::Dollar => Params::Positional(self.values),
        }
    }

    /// Get the number of parameters collected so far.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the builder is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
