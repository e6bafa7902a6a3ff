//! Scalar values, statement binds, and records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::column::TypeClass;

/// Scalar value as bound into statements and materialized from rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,
    /// Integer-classified value
    Integer(i64),
    /// Decimal-classified value
    Decimal(f64),
    /// Everything else, as the engine's raw text
    Text(String),
}

impl Value {
    /// Returns true for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as an integer when it holds one or parses as one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Decimal(v) if v.fract() == 0.0 => Some(*v as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the value as a float when it holds a number or parses as one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Decimal(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Null => None,
        }
    }

    /// Returns the text payload of a `Value::Text`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Coerces a raw engine value by the column's semantic type.
    ///
    /// Integer columns become `Integer`, decimal columns become `Decimal`,
    /// all others keep the raw value. Unparseable text is left untouched.
    pub fn coerce(self, class: TypeClass) -> Self {
        match (class, self) {
            (_, Self::Null) => Self::Null,
            (TypeClass::Integer, value) => match value.as_i64() {
                Some(v) => Self::Integer(v),
                None => value,
            },
            (TypeClass::Decimal, value) => match value.as_f64() {
                Some(v) => Self::Decimal(v),
                None => value,
            },
            (_, value) => value,
        }
    }

    /// Bind kind inferred from the value itself, for parameters with no column.
    pub fn inferred_kind(&self) -> BindKind {
        match self {
            Self::Integer(_) => BindKind::Integer,
            _ => BindKind::Text,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// How a value is bound into a prepared statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindKind {
    /// Bound as an integer parameter
    Integer,
    /// Bound as a string parameter
    Text,
}

/// Named parameter bound into a prepared statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Bind {
    /// Placeholder name without the leading colon
    pub name: String,
    /// Bound value
    pub value: Value,
    /// Parameter type
    pub kind: BindKind,
}

impl Bind {
    /// Creates a bind with an explicit kind.
    pub fn new(name: impl Into<String>, value: Value, kind: BindKind) -> Self {
        Self {
            name: name.into(),
            value,
            kind,
        }
    }

    /// Creates a bind whose kind is inferred from the value.
    pub fn inferred(name: impl Into<String>, value: Value) -> Self {
        let kind = value.inferred_kind();
        Self::new(name, value, kind)
    }

    /// Placeholder as it appears in SQL (`:name`).
    pub fn placeholder(&self) -> String {
        format!(":{}", self.name)
    }
}

/// One row as a mapping from column name to value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored for a column.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Sets a column value, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Sets a column value only when the record doesn't carry it yet.
    pub fn insert_missing(&mut self, name: &str, value: impl Into<Value>) {
        if !self.0.contains_key(name) {
            self.0.insert(name.to_string(), value.into());
        }
    }

    /// Removes a column value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Returns true when the record carries the column.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Column names carried by the record, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns carried.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no column is carried.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Integer view of a column, if present and integral.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Record {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_by_type_class() {
        assert_eq!(
            Value::from("42").coerce(TypeClass::Integer),
            Value::Integer(42)
        );
        assert_eq!(
            Value::from("3.25").coerce(TypeClass::Decimal),
            Value::Decimal(3.25)
        );
        assert_eq!(
            Value::from("2024-01-01 10:00:00").coerce(TypeClass::DateTime),
            Value::from("2024-01-01 10:00:00")
        );
        assert_eq!(Value::Null.coerce(TypeClass::Integer), Value::Null);
        // Unparseable text is preserved rather than zeroed
        assert_eq!(
            Value::from("abc").coerce(TypeClass::Integer),
            Value::from("abc")
        );
    }

    #[test]
    fn test_record_serializes_as_plain_map() {
        let record = Record::from([("id", Value::from(1)), ("keyword", Value::from("chat"))]);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "keyword": "chat"}));

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_insert_missing_keeps_caller_value() {
        let mut record = Record::from([("created_by", 7)]);
        record.insert_missing("created_by", 1);
        record.insert_missing("created_at", "2024-01-01 00:00:00");
        assert_eq!(record.get_i64("created_by"), Some(7));
        assert!(record.contains("created_at"));
    }

    #[test]
    fn test_bind_kind_inference() {
        assert_eq!(Bind::inferred("id", Value::from(3)).kind, BindKind::Integer);
        assert_eq!(Bind::inferred("code", Value::from("en")).kind, BindKind::Text);
        assert_eq!(Bind::inferred("code", Value::from("en")).placeholder(), ":code");
    }
}
