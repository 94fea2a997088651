//! Column data types for ShaleDB
//!
//! The catalog stores a type tag per column; BOOLEAN is reserved for
//! catalog bookkeeping and cannot appear in user table definitions.

use crate::error::DbRelationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Data types storable in a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 32-bit signed integer
    Int,
    /// Variable-length UTF-8 string
    Text,
    /// Boolean flag (catalog use only)
    Boolean,
}

impl DataType {
    /// The tag as stored in the `_columns.data_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Text => "TEXT",
            DataType::Boolean => "BOOLEAN",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = DbRelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INT" => Ok(DataType::Int),
            "TEXT" => Ok(DataType::Text),
            "BOOLEAN" => Ok(DataType::Boolean),
            other => Err(DbRelationError::Storage(format!(
                "unrecognized data type '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_parse_round_trip() {
        for data_type in [DataType::Int, DataType::Text, DataType::Boolean] {
            assert_eq!(data_type.to_string().parse::<DataType>().unwrap(), data_type);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_tag() {
        assert!("REAL".parse::<DataType>().is_err());
    }
}
