//! Query execution module
//!
//! Contains the DDL executor, the `QueryResult` value type, and its
//! display formatting.

pub mod executor;
pub mod format;

pub use executor::{ExecutionEngine, QueryResult};
