//! Parsed statement tree
//!
//! This is the interface the executor consumes; an external parser
//! produces these nodes. The tree deliberately carries more kinds than
//! the DDL executor runs, so unsupported statements can be answered
//! instead of rejected at parse time.

/// A SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE / INDEX / VIEW
    Create(CreateStatement),
    /// DROP TABLE / INDEX / VIEW
    Drop(DropStatement),
    /// SHOW TABLES / COLUMNS / INDEX
    Show(ShowStatement),
    /// SELECT statement (not run by the DDL executor)
    Select(SelectStatement),
    /// INSERT statement (not run by the DDL executor)
    Insert(InsertStatement),
}

/// CREATE statement variants
#[derive(Debug, Clone, PartialEq)]
pub enum CreateStatement {
    Table(CreateTableStatement),
    Index(CreateIndexStatement),
    View(CreateViewStatement),
}

/// DROP statement variants
#[derive(Debug, Clone, PartialEq)]
pub enum DropStatement {
    Table(DropTableStatement),
    Index(DropIndexStatement),
    View(DropViewStatement),
}

/// SHOW statement variants
#[derive(Debug, Clone, PartialEq)]
pub enum ShowStatement {
    Tables,
    Columns { table_name: String },
    Index { table_name: String },
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Table name
    pub table_name: String,
    /// Column definitions, in declared order
    pub columns: Vec<ColumnDef>,
    /// IF NOT EXISTS flag
    pub if_not_exists: bool,
}

/// Column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Declared type
    pub data_type: ColumnType,
}

/// Column types the parser delivers. `Double` parses but cannot be
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Text,
    Double,
}

/// CREATE INDEX statement, e.g.
/// `CREATE INDEX fx ON foo (a, b) USING BTREE`
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    /// Table the index is on
    pub table_name: String,
    /// Index name
    pub index_name: String,
    /// Indexed columns, in declared order
    pub columns: Vec<String>,
    /// Index type, e.g. "BTREE" or "HASH"
    pub index_type: String,
}

/// CREATE VIEW statement (recognized, not executed)
#[derive(Debug, Clone, PartialEq)]
pub struct CreateViewStatement {
    /// View name
    pub view_name: String,
    /// Defining query
    pub query: SelectStatement,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    /// Table name
    pub table_name: String,
}

/// DROP INDEX statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropIndexStatement {
    /// Table the index is on
    pub table_name: String,
    /// Index name
    pub index_name: String,
}

/// DROP VIEW statement (recognized, not executed)
#[derive(Debug, Clone, PartialEq)]
pub struct DropViewStatement {
    /// View name
    pub view_name: String,
}

/// SELECT statement, reduced to what an external parser delivers
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Source table
    pub table_name: String,
    /// Selected columns; empty means `*`
    pub columns: Vec<String>,
}

/// INSERT statement, reduced to what an external parser delivers
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table
    pub table_name: String,
    /// Column names (optional)
    pub columns: Option<Vec<String>>,
    /// Literal values, one list per row
    pub values: Vec<Vec<String>>,
}
