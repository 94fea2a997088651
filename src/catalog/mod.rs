//! System catalog module
//!
//! The catalog is self-describing: `_tables`, `_columns` and `_indices`
//! are themselves relations with rows about every relation and index,
//! their own included.

pub mod catalog;
pub mod indices;
pub mod schema;
pub mod tables;
pub mod types;

pub use catalog::Catalog;
pub use indices::Indices;
pub use tables::Tables;
pub use types::DataType;
