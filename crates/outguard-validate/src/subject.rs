//! Tabular data handed to the built-in validators.
//!
//! Validators receive subjects as `&dyn Any`; the built-in ones narrow to
//! [`Table`]. A record slot is `None` when the producer could not build the
//! record at all (e.g. an unparseable input row).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    List(Vec<Value>),
}

impl Value {
    /// Kind of this value (never [`ValueKind::Any`]).
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::UInt(_) => ValueKind::UInt,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::List(_) => ValueKind::List,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of integer and float values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// JSON form used in error contexts and violations.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => (*b).into(),
            Self::Int(v) => (*v).into(),
            Self::UInt(v) => (*v).into(),
            Self::Float(v) => (*v).into(),
            Self::Text(s) => s.as_str().into(),
            Self::Timestamp(t) => t.to_rfc3339().into(),
            Self::List(items) => items.iter().map(Value::to_json).collect(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Timestamp(t) => f.write_str(&t.to_rfc3339()),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

macro_rules! value_from {
    ($variant:ident, $target:ty; $($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(<$target>::from(v))
            }
        })*
    };
}

value_from!(Int, i64; i8, i16, i32, i64);
value_from!(UInt, u64; u8, u16, u32, u64);
value_from!(Float, f64; f32, f64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Expected or actual kind of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    UInt,
    Float,
    Text,
    Timestamp,
    List,
    /// Matches every value, including null.
    Any,
}

impl ValueKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::UInt | Self::Float)
    }

    /// Whether a value of kind `actual` satisfies this expected kind.
    ///
    /// Numeric kinds are mutually compatible.
    pub fn accepts(&self, actual: ValueKind) -> bool {
        match self {
            Self::Any => true,
            expected if expected.is_numeric() => actual.is_numeric(),
            expected => *expected == actual,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "nil",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::Text => "string",
            Self::Timestamp => "time",
            Self::List => "list",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a type name in configuration is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown value kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for ValueKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_lowercase().as_str() {
            "nil" | "null" => Self::Null,
            "bool" | "boolean" => Self::Bool,
            "int" | "integer" | "int8" | "int16" | "int32" | "int64" => Self::Int,
            "uint" | "uint8" | "uint16" | "uint32" | "uint64" => Self::UInt,
            "float" | "float32" | "float64" | "number" | "numeric" => Self::Float,
            "string" | "text" | "str" => Self::Text,
            "time" | "timestamp" | "datetime" => Self::Timestamp,
            "list" | "array" => Self::List,
            "any" => Self::Any,
            _ => return Err(UnknownKind(s.to_string())),
        };
        Ok(kind)
    }
}

/// One row, keyed by column name.
pub type Record = BTreeMap<String, Value>;

/// A table of records with declared column keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub title: Option<String>,
    /// Declared columns, in display order.
    pub keys: Vec<String>,
    /// Record slots; `None` marks a record that could not be built.
    pub records: Vec<Option<Record>>,
}

impl Table {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: None,
            keys: keys.into_iter().map(Into::into).collect(),
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a record built from `(column, value)` pairs.
    pub fn push<I, K, V>(&mut self, cells: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let record = cells
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.records.push(Some(record));
    }

    /// Append an empty record slot.
    pub fn push_missing(&mut self) {
        self.records.push(None);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Present records with their slot index.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|r| (idx, r)))
    }
}

/// JSON object for a record, used as a violation value.
pub fn record_to_json(record: &Record) -> serde_json::Value {
    record
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_kinds_are_compatible() {
        assert!(ValueKind::Int.accepts(ValueKind::Float));
        assert!(ValueKind::Float.accepts(ValueKind::UInt));
        assert!(!ValueKind::Int.accepts(ValueKind::Text));
        assert!(ValueKind::Any.accepts(ValueKind::Null));
        assert!(!ValueKind::Text.accepts(ValueKind::Null));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("int32".parse::<ValueKind>(), Ok(ValueKind::Int));
        assert_eq!("String".parse::<ValueKind>(), Ok(ValueKind::Text));
        assert!("blob".parse::<ValueKind>().is_err());
    }

    #[test]
    fn test_widths_collapse() {
        assert_eq!(Value::from(7u8).kind(), ValueKind::UInt);
        assert_eq!(Value::from(7i16).kind(), ValueKind::Int);
        assert_eq!(Value::from(1.5f32).kind(), ValueKind::Float);
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn test_rows_skip_missing_slots() {
        let mut table = Table::new(["Name"]);
        table.push([("Name", "Ada")]);
        table.push_missing();
        table.push([("Name", "Grace")]);
        let indices: Vec<usize> = table.rows().map(|(idx, _)| idx).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(table.len(), 3);
    }
}
