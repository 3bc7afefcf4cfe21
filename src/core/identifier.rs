//! Identifier values and scalar-or-sequence normalization
//!
//! Mapping records store identifiers inconsistently: `mal_id` may be `1234`
//! or `[1234, 5678]`, `imdb_id` may be `"tt123"` or `["tt123", "tt456"]`.
//! Everything that compares identifiers goes through [`identifiers`] first so
//! both shapes behave the same.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Smallest integral `f64` outside the `i64` range (2^63)
const I64_END: f64 = 9_223_372_036_854_775_808.0;

/// Smallest integral `f64` outside the `u64` range (2^64)
const U64_END: f64 = 18_446_744_073_709_551_616.0;

/// A single normalized identifier
///
/// Numbers and strings never compare equal: `38524` does not match `"38524"`
/// and `5.5` does not match `"5.5"`. Every number has exactly one
/// representation, so equal numbers always hash alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identifier {
    Int(i64),
    /// Integer above `i64::MAX`
    UInt(u64),
    /// Bit pattern of a finite, non-integral or out-of-range `f64`
    Float(u64),
    Text(String),
}

impl Identifier {
    /// Parse a command-line identifier, preferring a number when possible
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Identifier::Int(n);
        }
        if let Ok(n) = trimmed.parse::<u64>() {
            return Identifier::UInt(n);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::from_f64(f),
            _ => Identifier::Text(trimmed.to_string()),
        }
    }

    /// Normalize a float, integral values in range become integers
    fn from_f64(f: f64) -> Self {
        if f.fract() == 0.0 {
            if (-I64_END..I64_END).contains(&f) {
                return Identifier::Int(f as i64);
            }
            if (I64_END..U64_END).contains(&f) {
                return Identifier::UInt(f as u64);
            }
        }
        Identifier::Float(f.to_bits())
    }

    /// Build a string identifier without attempting integer parsing
    pub fn text(raw: impl Into<String>) -> Self {
        Identifier::Text(raw.into())
    }

    /// Normalize a single scalar JSON value
    ///
    /// Returns `None` for values that carry no identifier (null, empty
    /// string, booleans, arrays, objects).
    fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Identifier::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Identifier::UInt(u))
                } else {
                    n.as_f64().map(Self::from_f64)
                }
            }
            Value::String(s) if !s.is_empty() => Some(Identifier::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Int(n) => write!(f, "{}", n),
            Identifier::UInt(n) => write!(f, "{}", n),
            Identifier::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            Identifier::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Identifier::Int(n) => serializer.serialize_i64(*n),
            Identifier::UInt(n) => serializer.serialize_u64(*n),
            Identifier::Float(bits) => serializer.serialize_f64(f64::from_bits(*bits)),
            Identifier::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Identifier::Int(n)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier::Text(s.to_string())
    }
}

/// Returns true if the value counts as "absent"
///
/// Absent means null, false, zero, empty string, empty array or an object.
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) | Value::Object(_) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Bool(true) => false,
    }
}

/// Normalize a field value into an ordered list of identifiers
///
/// Scalars become a one-element list, arrays keep their element order.
/// Absent values yield an empty list.
pub fn identifiers(value: &Value) -> Vec<Identifier> {
    if is_absent(value) {
        return Vec::new();
    }
    match value {
        Value::Array(items) => items.iter().filter_map(Identifier::from_scalar).collect(),
        other => Identifier::from_scalar(other).into_iter().collect(),
    }
}

/// Check whether a field value holds the target identifier
pub fn contains(value: &Value, target: &Identifier) -> bool {
    identifiers(value).iter().any(|id| id == target)
}
