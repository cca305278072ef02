//! Query and filter operations for JSONL data.
//!
//! A [`Query`] is a set of exact-match constraints on top-level record
//! fields. A record matches when it contains every queried field with an
//! equal value; fields the query does not mention are ignored, and an empty
//! query matches every record. A record that is not a JSON object has no
//! fields, so only the empty query matches it.
//!
//! Equality is structural: nested arrays and objects match when their
//! contents are equal. Numbers compare by numeric value, so `1` and `1.0`
//! are the same value.
//!
//! # Examples
//!
//! ```
//! use ndtable_jsonl::Query;
//! use serde_json::json;
//!
//! let query = Query::new().with("city", "Roma");
//!
//! let roma = json!({"city": "Roma", "id": 1});
//! let milano = json!({"city": "Milano", "id": 2});
//! assert!(query.matches(&roma));
//! assert!(!query.matches(&milano));
//! assert!(!query.matches(&json!([1, 2])));
//! ```

use crate::Record;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Exact-match filter over record fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query {
    fields: Map<String, Value>,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query that matches every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds a constraint that `field` must equal `value`.
    ///
    /// A later constraint on the same field replaces the earlier one.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Parses a `field=value` assignment into a field name and expected value.
    ///
    /// The value is read as JSON when it is valid JSON (`id=1`,
    /// `active=true`, `name="x"`), otherwise as a plain string (`city=Roma`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if there is no `=` or the field
    /// name is empty.
    pub fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
        let Some((field, raw)) = assignment.split_once('=') else {
            return Err(Error::InvalidFormat(format!(
                "expected field=value, got '{assignment}'"
            )));
        };

        let field = field.trim();
        if field.is_empty() {
            return Err(Error::InvalidFormat(format!(
                "missing field name in '{assignment}'"
            )));
        }

        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Ok((field.to_string(), value))
    }

    /// Returns `true` if the record satisfies every constraint.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        let Some(record) = record.as_object() else {
            return self.is_empty();
        };
        self.fields.iter().all(|(field, expected)| {
            record
                .get(field)
                .is_some_and(|actual| values_equal(actual, expected))
        })
    }

    /// Returns the expected value for `field`, if constrained.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the constrained field names.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns the number of constraints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the query has no constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for Query {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for Query {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(Error::InvalidFormat(format!(
                "query must be a JSON object, got {other}"
            ))),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        }
    }
}

/// Structural equality with numeric comparison by value.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => left == right,
    }
}

#[allow(clippy::float_cmp)]
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
