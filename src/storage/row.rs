//! Value and row types for ShaleDB
//!
//! A `Row` maps column names to tagged values. Rows carry no intrinsic
//! column order; order comes from the relation schema when marshalling
//! or printing.

use crate::catalog::DataType;
use crate::error::DbRelationError;
use serde::{Deserialize, Serialize};
use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;

/// A tagged scalar value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Integer value (32-bit)
    Int(i32),
    /// String value
    Text(String),
    /// Boolean value
    Boolean(bool),
}

impl Value {
    /// The type tag this value carries.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Text(_) => DataType::Text,
            Value::Boolean(_) => DataType::Boolean,
        }
    }

    /// Read the integer payload.
    pub fn as_int(&self) -> Result<i32, DbRelationError> {
        match self {
            Value::Int(n) => Ok(*n),
            other => Err(other.mismatch(DataType::Int)),
        }
    }

    /// Read the string payload.
    pub fn as_text(&self) -> Result<&str, DbRelationError> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(other.mismatch(DataType::Text)),
        }
    }

    /// Read the boolean payload.
    pub fn as_bool(&self) -> Result<bool, DbRelationError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(other.mismatch(DataType::Boolean)),
        }
    }

    fn mismatch(&self, expected: DataType) -> DbRelationError {
        DbRelationError::TypeMismatch {
            expected: expected.to_string(),
            found: self.data_type().to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// A row keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<String, Value>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Get the value stored under `column`.
    pub fn get(&self, column: &str) -> Result<&Value, DbRelationError> {
        self.values
            .get(column)
            .ok_or_else(|| DbRelationError::UnknownColumn(column.to_string()))
    }

    /// Insert or overwrite the value stored under `column`.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over (column, value) pairs in no particular order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, Value> {
        self.values.iter()
    }

    /// True when every column of `predicate` is present with an equal value.
    pub fn matches(&self, predicate: &Row) -> bool {
        predicate
            .iter()
            .all(|(column, value)| self.values.get(column) == Some(value))
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = (&'a String, &'a Value);
    type IntoIter = hash_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
