//! Error types for ShaleDB
//!
//! Failures are layered: `DbRelationError` covers the storage engine and
//! the catalog relations, `SqlExecError` is the single kind surfaced by
//! the DDL executor.

use thiserror::Error;

/// Failures raised by heap relations, indices, and the disk layer.
#[derive(Error, Debug)]
pub enum DbRelationError {
    #[error("table '{0}' is not in the catalog")]
    UnknownTable(String),

    #[error("index '{0}' on table '{1}' is not in the catalog")]
    UnknownIndex(String, String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("expected a {expected} value, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("duplicate key in unique index '{0}'")]
    DuplicateKey(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The error surfaced by the DDL executor.
///
/// Storage-layer failures convert through the `Relation` variant, which
/// re-surfaces the original message behind a `DbRelationError: ` prefix.
#[derive(Error, Debug)]
pub enum SqlExecError {
    /// A DDL-level validation failure carrying a user-facing message.
    #[error("{0}")]
    Exec(String),

    /// A storage or catalog failure crossing the executor boundary.
    #[error("DbRelationError: {0}")]
    Relation(#[from] DbRelationError),
}

/// Result alias for the storage and catalog layers.
pub type DbResult<T> = std::result::Result<T, DbRelationError>;

/// Result alias for executor operations.
pub type Result<T> = std::result::Result<T, SqlExecError>;
