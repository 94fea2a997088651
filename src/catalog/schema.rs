//! Logical schemas of the self-describing system catalog.
//!
//! The three catalog relations cannot look themselves up, so their names
//! and column lists are fixed here and seeded into `_tables` and
//! `_columns` on first use.

use super::types::DataType;

/// Relation listing every table, itself included.
pub const TABLES_TABLE: &str = "_tables";

/// Relation listing every column of every table.
pub const COLUMNS_TABLE: &str = "_columns";

/// Relation listing every index column.
pub const INDICES_TABLE: &str = "_indices";

pub const TABLES_SCHEMA: &[(&str, DataType)] = &[("table_name", DataType::Text)];

pub const COLUMNS_SCHEMA: &[(&str, DataType)] = &[
    ("table_name", DataType::Text),
    ("column_name", DataType::Text),
    ("data_type", DataType::Text),
];

pub const INDICES_SCHEMA: &[(&str, DataType)] = &[
    ("table_name", DataType::Text),
    ("index_name", DataType::Text),
    ("column_name", DataType::Text),
    ("seq_in_index", DataType::Int),
    ("index_type", DataType::Text),
    ("is_unique", DataType::Boolean),
];

/// True for the three relations that describe the catalog itself.
pub fn is_schema_table(name: &str) -> bool {
    name == TABLES_TABLE || name == COLUMNS_TABLE || name == INDICES_TABLE
}

/// Split a schema constant into the owned lists a relation wants.
pub fn columns_of(schema: &[(&str, DataType)]) -> (Vec<String>, Vec<DataType>) {
    let names = schema.iter().map(|(name, _)| name.to_string()).collect();
    let types = schema.iter().map(|(_, data_type)| *data_type).collect();
    (names, types)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_schema_table() {
        assert!(is_schema_table("_tables"));
        assert!(is_schema_table("_columns"));
        assert!(is_schema_table("_indices"));
        assert!(!is_schema_table("users"));
    }

    #[test]
    fn test_columns_of_preserves_order() {
        let (names, types) = columns_of(INDICES_SCHEMA);
        assert_eq!(names[3], "seq_in_index");
        assert_eq!(types[3], DataType::Int);
        assert_eq!(names.len(), 6);
    }
}
