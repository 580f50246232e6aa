//! Typed item values.

use serde::{Deserialize, Serialize};

use crate::schema::FieldType;

/// The in-memory value of one item in one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Character items, padding included.
    Text(String),
    /// Integer and binary-integer items.
    Int(i64),
    /// Numeric and float items.
    Float(f64),
}

impl Value {
    /// Zero value for an item of the given type.
    pub fn zero(kind: FieldType) -> Self {
        match kind {
            FieldType::Character | FieldType::Date => Value::Text(String::new()),
            FieldType::BcdInteger | FieldType::BinaryInt => Value::Int(0),
            FieldType::Numeric | FieldType::Float => Value::Float(0.0),
        }
    }

    /// Build the value an item of `kind` stores for the number `n`.
    ///
    /// Integer items round to the nearest integer. Returns `None` for
    /// non-numeric item types.
    pub fn from_number(kind: FieldType, n: f64) -> Option<Self> {
        match kind {
            FieldType::BcdInteger | FieldType::BinaryInt => Some(Value::Int(n.round() as i64)),
            FieldType::Numeric | FieldType::Float => Some(Value::Float(n)),
            FieldType::Character | FieldType::Date => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(f.round() as i64),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Int(_) => "integer",
            Value::Float(_) => "floating",
        }
    }
}
