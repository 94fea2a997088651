//! ShaleDB - a small relational database engine written in Rust
//!
//! This library provides the core components for executing DDL:
//! - Parsed statement tree (`sql`)
//! - Self-describing system catalog (`catalog`)
//! - Heap-file storage engine with secondary indices (`storage`)
//! - DDL execution and result formatting (`executor`)

pub mod catalog;
pub mod error;
pub mod executor;
pub mod sql;
pub mod storage;

pub use error::{DbRelationError, DbResult, Result, SqlExecError};
