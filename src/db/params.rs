//! Parameter sets bound to prepared statements.

use super::value::Value;

/// Parameters for one statement execution.
///
/// Positional parameters bind to `?` / `$n` placeholders in order. Named
/// parameters bind to `:name` placeholders; names are stored without the
/// leading colon.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}

impl Params {
    /// Create an empty positional parameter set.
    pub fn new() -> Self {
        Params::Positional(Vec::new())
    }

    /// Create an empty named parameter set.
    pub fn named() -> Self {
        Params::Named(Vec::new())
    }

    /// Append a positional value.
    ///
    /// Calling this on a named set converts nothing; the value is given a
    /// synthetic name `p{n}` so the set stays homogeneous.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        match &mut self {
            Params::Positional(values) => values.push(value.into()),
            Params::Named(pairs) => {
                let name = format!("p{}", pairs.len() + 1);
                pairs.push((name, value.into()));
            }
        }
        self
    }

    /// Insert a named value, replacing an earlier value of the same name.
    ///
    /// A positional set with no values yet becomes a named set.
    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<Value>) -> Self {
        let name = normalize_name(name.as_ref());
        if let Params::Positional(values) = &self {
            if values.is_empty() {
                self = Params::Named(Vec::new());
            }
        }
        match &mut self {
            Params::Named(pairs) => {
                let value = value.into();
                match pairs.iter_mut().find(|(existing, _)| *existing == name) {
                    Some(slot) => slot.1 = value,
                    None => pairs.push((name, value)),
                }
            }
            Params::Positional(values) => values.push(value.into()),
        }
        self
    }

    pub fn len(&self) -> usize {
        match self {
            Params::Positional(values) => values.len(),
            Params::Named(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Params::Named(_))
    }

    /// Look up a named value (with or without the leading colon).
    pub fn get(&self, name: &str) -> Option<&Value> {
        let name = normalize_name(name);
        match self {
            Params::Named(pairs) => pairs.iter().find(|(n, _)| *n == name).map(|(_, v)| v),
            Params::Positional(_) => None,
        }
    }

    /// Values in binding order, dropping names.
    pub fn values(&self) -> Vec<&Value> {
        match self {
            Params::Positional(values) => values.iter().collect(),
            Params::Named(pairs) => pairs.iter().map(|(_, v)| v).collect(),
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Into<Value>> From<Vec<V>> for Params {
    fn from(values: Vec<V>) -> Self {
        Params::Positional(values.into_iter().map(Into::into).collect())
    }
}

impl<K: AsRef<str>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs
            .into_iter()
            .fold(Params::named(), |params, (k, v)| params.with(k, v))
    }
}

fn normalize_name(name: &str) -> String {
    name.strip_prefix(':').unwrap_or(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_new_is_empty_positional() {
        let params = Params::new();
        assert!(params.is_empty());
        assert!(!params.is_named());
    }

    #[test]
    fn test_bind_positional() {
        let params = Params::new().bind(100).bind("T%");
        assert_eq!(params, Params::Positional(vec![Value::Int(100), Value::from("T%")]));
    }

    #[test]
    fn test_with_strips_colon() {
        let params = Params::named().with(":age", 18);
        assert_eq!(params.get("age"), Some(&Value::Int(18)));
        assert_eq!(params.get(":age"), Some(&Value::Int(18)));
    }

    #[test]
    fn test_with_overwrites_same_name() {
        let params = Params::named().with("key", 1).with("key", 2);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("key"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_with_on_empty_positional_becomes_named() {
        let params = Params::new().with("age", 18);
        assert!(params.is_named());
    }

    #[test]
    fn test_from_array_of_pairs() {
        let params = Params::from([(":age", 18)]);
        assert_eq!(params, Params::Named(vec![("age".to_string(), Value::Int(18))]));
    }

    #[test]
    fn test_bind_on_named_synthesizes_name() {
        let params = Params::named().with("a", 1).bind(2);
        assert_eq!(params.get("p2"), Some(&Value::Int(2)));
    }
}
