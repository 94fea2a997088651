//! The `_tables` catalog relation.
//!
//! `Tables` manages the relation-of-relations and acts as the factory for
//! every other relation: user tables are instantiated from their
//! `_columns` rows, the catalog relations from the schemas fixed in
//! [`super::schema`].

use super::schema::{self, COLUMNS_TABLE, INDICES_TABLE, TABLES_TABLE};
use super::types::DataType;
use crate::error::{DbRelationError, DbResult};
use crate::storage::{DbRelation, DiskManager, HeapTable, Row, SlotId};
use std::collections::HashMap;
use std::sync::Arc;

/// Metadata manager for `_tables`, caching every relation it opens.
#[derive(Debug)]
pub struct Tables {
    disk: Arc<DiskManager>,
    relation: HeapTable,
    cache: HashMap<String, HeapTable>,
}

impl Tables {
    /// Open the `_tables` and `_columns` heaps, creating and seeding them
    /// with their own descriptions on first use.
    pub fn new(disk: Arc<DiskManager>) -> DbResult<Self> {
        let fresh = !disk.exists(TABLES_TABLE);

        let (names, types) = schema::columns_of(schema::TABLES_SCHEMA);
        let mut relation = HeapTable::new(disk.clone(), TABLES_TABLE, names, types);
        relation.create_if_not_exists()?;

        let (names, types) = schema::columns_of(schema::COLUMNS_SCHEMA);
        let mut columns = HeapTable::new(disk.clone(), COLUMNS_TABLE, names, types);
        columns.create_if_not_exists()?;

        let mut tables = Self {
            disk,
            relation,
            cache: HashMap::new(),
        };
        tables.cache.insert(COLUMNS_TABLE.to_string(), columns);
        if fresh {
            tables.bootstrap()?;
        }
        Ok(tables)
    }

    /// Seed the catalog with rows describing `_tables`, `_columns` and
    /// `_indices`, so the catalog can look itself up.
    fn bootstrap(&mut self) -> DbResult<()> {
        log::debug!("seeding system catalog");
        for name in [TABLES_TABLE, COLUMNS_TABLE, INDICES_TABLE] {
            let mut row = Row::new();
            row.set("table_name", name);
            self.relation.insert(&row)?;
        }

        let described: [(&str, &[(&str, DataType)]); 3] = [
            (TABLES_TABLE, schema::TABLES_SCHEMA),
            (COLUMNS_TABLE, schema::COLUMNS_SCHEMA),
            (INDICES_TABLE, schema::INDICES_SCHEMA),
        ];
        let columns = self.columns_relation();
        for (table_name, table_schema) in described {
            for (column_name, data_type) in table_schema {
                let mut row = Row::new();
                row.set("table_name", table_name);
                row.set("column_name", *column_name);
                row.set("data_type", data_type.to_string());
                columns.insert(&row)?;
            }
        }
        Ok(())
    }

    /// Open (and cache) a relation by name. User tables are looked up in
    /// the catalog and fail with `UnknownTable` when no `_tables` row
    /// exists.
    pub fn get_table(&mut self, name: &str) -> DbResult<&mut dyn DbRelation> {
        if name == TABLES_TABLE {
            return Ok(&mut self.relation);
        }
        if !self.cache.contains_key(name) {
            let mut table = if name == COLUMNS_TABLE {
                let (names, types) = schema::columns_of(schema::COLUMNS_SCHEMA);
                HeapTable::new(self.disk.clone(), COLUMNS_TABLE, names, types)
            } else {
                let mut filter = Row::new();
                filter.set("table_name", name);
                if self.relation.select(Some(&filter))?.is_empty() {
                    return Err(DbRelationError::UnknownTable(name.to_string()));
                }
                let (names, types) = self.get_columns(name)?;
                HeapTable::new(self.disk.clone(), name, names, types)
            };
            if self.disk.exists(name) {
                table.open()?;
            }
            self.cache.insert(name.to_string(), table);
        }
        Ok(self.cache.get_mut(name).unwrap())
    }

    /// Column names and types of `table_name`, in insertion order. This is
    /// the source of truth for instantiating user relations.
    pub fn get_columns(&mut self, table_name: &str) -> DbResult<(Vec<String>, Vec<DataType>)> {
        let mut filter = Row::new();
        filter.set("table_name", table_name);
        let projected = ["column_name".to_string(), "data_type".to_string()];

        let columns = self.columns_relation();
        let mut names = Vec::new();
        let mut types = Vec::new();
        for handle in columns.select(Some(&filter))? {
            let row = columns.project(handle, &projected)?;
            names.push(row.get("column_name")?.as_text()?.to_string());
            types.push(row.get("data_type")?.as_text()?.parse()?);
        }
        Ok((names, types))
    }

    /// Append a `_tables` row, which must carry `table_name`.
    pub fn insert(&mut self, row: &Row) -> DbResult<SlotId> {
        row.get("table_name")?;
        self.relation.insert(row)
    }

    /// Delete a `_tables` row. Leaves `_columns` and the physical relation
    /// alone; the executor owns that ordering.
    pub fn del(&mut self, handle: SlotId) -> DbResult<()> {
        self.relation.del(handle)
    }

    pub fn select(&mut self, predicate: Option<&Row>) -> DbResult<Vec<SlotId>> {
        self.relation.select(predicate)
    }

    pub fn project(&mut self, handle: SlotId, columns: &[String]) -> DbResult<Row> {
        self.relation.project(handle, columns)
    }

    /// Forget a cached relation, e.g. after its physical drop.
    pub fn release(&mut self, name: &str) {
        self.cache.remove(name);
    }

    fn columns_relation(&mut self) -> &mut HeapTable {
        self.cache.entry(COLUMNS_TABLE.to_string()).or_insert_with(|| {
            let (names, types) = schema::columns_of(schema::COLUMNS_SCHEMA);
            HeapTable::new(self.disk.clone(), COLUMNS_TABLE, names, types)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tables(dir: &TempDir) -> Tables {
        let disk = Arc::new(DiskManager::new(dir.path()).unwrap());
        Tables::new(disk).unwrap()
    }

    #[test]
    fn test_bootstrap_describes_the_catalog() {
        let dir = TempDir::new().unwrap();
        let mut tables = tables(&dir);

        // one _tables row per catalog relation
        assert_eq!(tables.select(None).unwrap().len(), 3);

        let (names, types) = tables.get_columns(INDICES_TABLE).unwrap();
        assert_eq!(
            names,
            vec![
                "table_name",
                "index_name",
                "column_name",
                "seq_in_index",
                "index_type",
                "is_unique"
            ]
        );
        assert_eq!(types[3], DataType::Int);
        assert_eq!(types[5], DataType::Boolean);
    }

    #[test]
    fn test_bootstrap_runs_once() {
        let dir = TempDir::new().unwrap();
        let disk = Arc::new(DiskManager::new(dir.path()).unwrap());
        {
            Tables::new(disk.clone()).unwrap();
        }
        let mut tables = Tables::new(disk).unwrap();
        assert_eq!(tables.select(None).unwrap().len(), 3);
    }

    #[test]
    fn test_get_table_unknown() {
        let dir = TempDir::new().unwrap();
        let mut tables = tables(&dir);
        assert!(matches!(
            tables.get_table("nope").err(),
            Some(DbRelationError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_get_table_resolves_user_table_from_columns() {
        let dir = TempDir::new().unwrap();
        let mut tables = tables(&dir);

        let mut row = Row::new();
        row.set("table_name", "users");
        tables.insert(&row).unwrap();

        let columns = tables.get_table(COLUMNS_TABLE).unwrap();
        for (column_name, data_type) in [("id", "INT"), ("name", "TEXT")] {
            let mut row = Row::new();
            row.set("table_name", "users");
            row.set("column_name", column_name);
            row.set("data_type", data_type);
            columns.insert(&row).unwrap();
        }

        let users = tables.get_table("users").unwrap();
        assert_eq!(users.column_names(), ["id", "name"]);
        assert_eq!(users.column_types(), [DataType::Int, DataType::Text]);
    }

    #[test]
    fn test_insert_requires_table_name() {
        let dir = TempDir::new().unwrap();
        let mut tables = tables(&dir);
        assert!(matches!(
            tables.insert(&Row::new()),
            Err(DbRelationError::UnknownColumn(_))
        ));
    }
}
