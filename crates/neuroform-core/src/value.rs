//! The scalar value type shared by the edit cache, the session document, and
//! the wire format.

use crate::error::{NeuroformError, Result};
use crate::schema::FieldKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field's value as the remote store sees it.
///
/// The untagged representation matches the backend's JSON: `null`, booleans,
/// numbers, and strings, nothing nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Collapses the empty-string sentinel to `Null`.
    ///
    /// A cleared input and a never-set field are indistinguishable after
    /// normalization; every value entering the cache passes through here.
    pub fn normalized(self) -> Self {
        match self {
            Self::Text(s) if s.is_empty() => Self::Null,
            other => other,
        }
    }

    /// Converts a scalar JSON value. Arrays and objects (the server's
    /// computed aggregate keys) are not field values and yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Self::Null),
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Integer(i))
                } else {
                    n.as_f64().map(Self::Number)
                }
            }
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Number(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Number(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Parses raw widget input according to the field's declared kind.
///
/// The empty string always maps to `Null`, regardless of kind: an input a
/// user cleared carries no value.
pub fn parse_field_value(kind: FieldKind, field: &str, raw: &str) -> Result<FieldValue> {
    if raw.is_empty() {
        return Ok(FieldValue::Null);
    }

    match kind {
        FieldKind::Checkbox => match raw {
            "true" => Ok(FieldValue::Bool(true)),
            "false" => Ok(FieldValue::Bool(false)),
            _ => Err(NeuroformError::invalid_value(
                field,
                format!("expected 'true' or 'false', got '{}'", raw),
            )),
        },
        FieldKind::Integer => raw
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|e| NeuroformError::invalid_value(field, e.to_string())),
        FieldKind::Number => raw
            .parse::<f64>()
            .map(FieldValue::Number)
            .map_err(|e| NeuroformError::invalid_value(field, e.to_string())),
        FieldKind::Text | FieldKind::List => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::Unknown => Err(NeuroformError::invalid_value(
            field,
            "field has no editable kind",
        )),
    }
}
