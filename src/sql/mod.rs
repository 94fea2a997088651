//! SQL statement tree consumed by the executor.

pub mod ast;

pub use ast::Statement;
