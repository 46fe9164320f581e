use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Insertion-ordered dictionary. Equality ignores key order.
pub type Dictionary = IndexMap<String, Value>;

/// A decoded property-list document: the root dictionary.
pub type Document = Dictionary;

/// A property-list value restricted to the kinds profiles carry.
///
/// Serializes to the equivalent JSON shape, which is what the content digest
/// and the CLI's JSON inputs use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// `<dict>`
    Dictionary(Dictionary),
    /// `<array>`
    Array(Vec<Value>),
    /// `<string>`
    String(String),
    /// `<integer>`
    Integer(i64),
    /// `<true/>` / `<false/>`
    Boolean(bool),
}

/// Discriminant of a [`Value`], used in error messages and kind checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Dictionary.
    Dictionary,
    /// Array.
    Array,
    /// String.
    String,
    /// Integer.
    Integer,
    /// Boolean.
    Boolean,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Dictionary => "dictionary",
            ValueKind::Array => "array",
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Dictionary(_) => ValueKind::Dictionary,
            Value::Array(_) => ValueKind::Array,
            Value::String(_) => ValueKind::String,
            Value::Integer(_) => ValueKind::Integer,
            Value::Boolean(_) => ValueKind::Boolean,
        }
    }

    /// Returns the dictionary if this is one.
    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the array if this is one.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the string if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<Dictionary> for Value {
    fn from(value: Dictionary) -> Self {
        Value::Dictionary(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_equality_ignores_key_order() {
        let mut a = Dictionary::new();
        a.insert("x".into(), Value::Integer(1));
        a.insert("y".into(), Value::Boolean(true));
        let mut b = Dictionary::new();
        b.insert("y".into(), Value::Boolean(true));
        b.insert("x".into(), Value::Integer(1));
        assert_eq!(Value::Dictionary(a), Value::Dictionary(b));
    }

    #[test]
    fn array_equality_is_order_sensitive() {
        let a = Value::Array(vec![1.into(), 2.into()]);
        let b = Value::Array(vec![2.into(), 1.into()]);
        assert_ne!(a, b);
    }

    #[test]
    fn json_shape_round_trips() {
        let value: Value =
            serde_json::from_str(r#"{"group_ids":[3,1],"name":"x","on":false}"#).unwrap();
        let map = value.as_dictionary().unwrap();
        assert_eq!(map["group_ids"].kind(), ValueKind::Array);
        assert_eq!(map["name"].as_str(), Some("x"));
        assert_eq!(map["on"].as_bool(), Some(false));
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"group_ids":[3,1],"name":"x","on":false}"#
        );
    }
}
