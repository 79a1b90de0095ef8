// src/core/types/value.rs

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A tagged scalar value.
///
/// A `Value` is either a typed payload or `Null`, and `Null` carries no
/// observable payload of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Varchar(String),
    Text(String),
    Boolean(bool),
    Null,
}

/// Stable, arbitrary ordering over the type tags, used only to break ties
/// when two non-NULL values of different types are compared.
fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Integer(_) => 0,
        Value::Float(_) => 1,
        Value::Varchar(_) => 2,
        Value::Text(_) => 3,
        Value::Boolean(_) => 4,
        Value::Null => unreachable!("Null is ranked before type comparison"),
    }
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INT",
            Value::Float(_) => "FLOAT",
            Value::Varchar(_) => "VARCHAR",
            Value::Text(_) => "TEXT",
            Value::Boolean(_) => "BOOLEAN",
            Value::Null => "NULL",
        }
    }

    /// Case-sensitive SQL `LIKE` match with `%` (any run) and `_` (any one
    /// character) wildcards. Non-string operands never match.
    #[must_use]
    pub fn like(&self, pattern: &str) -> bool {
        let (Value::Varchar(s) | Value::Text(s)) = self else {
            return false;
        };
        like_match(s.as_bytes(), pattern.as_bytes())
    }
}

fn like_match(s: &[u8], pattern: &[u8]) -> bool {
    match pattern.first() {
        None => s.is_empty(),
        Some(b'%') => {
            like_match(s, &pattern[1..])
                || (!s.is_empty() && like_match(&s[1..], pattern))
        }
        Some(b'_') => !s.is_empty() && like_match(&s[1..], &pattern[1..]),
        Some(c) => !s.is_empty() && s[0] == *c && like_match(&s[1..], &pattern[1..]),
    }
}

/// NULL sorts first, then (when types differ) a stable type tag
/// comparison, then a natural per-type comparison.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Varchar(a), Value::Varchar(b) | Value::Text(b))
            | (Value::Text(a), Value::Varchar(b) | Value::Text(b)) => {
                a.as_bytes().cmp(b.as_bytes())
            }
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            _ => type_rank(self).cmp(&type_rank(other)),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Varchar(s) | Value::Text(s) => write!(f, "{s}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Null => write!(f, "NULL"),
        }
    }
}
