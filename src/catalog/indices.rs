//! The `_indices` catalog relation.
//!
//! `Indices` manages index metadata and acts as the factory for physical
//! indices: the column list, ordering and uniqueness of an index are
//! recovered from its `_indices` rows.

use super::schema::{self, INDICES_TABLE};
use crate::error::{DbRelationError, DbResult};
use crate::storage::{BTreeIndex, DbIndex, DbRelation, DiskManager, HeapTable, Row, SlotId};
use std::collections::HashMap;
use std::sync::Arc;

/// Metadata manager for `_indices`, caching every physical index it opens.
#[derive(Debug)]
pub struct Indices {
    disk: Arc<DiskManager>,
    relation: HeapTable,
    cache: HashMap<(String, String), BTreeIndex>,
}

impl Indices {
    /// Open the `_indices` heap, creating it on first use. Its catalog
    /// description is seeded by [`super::tables::Tables`].
    pub fn new(disk: Arc<DiskManager>) -> DbResult<Self> {
        let (names, types) = schema::columns_of(schema::INDICES_SCHEMA);
        let mut relation = HeapTable::new(disk.clone(), INDICES_TABLE, names, types);
        relation.create_if_not_exists()?;
        Ok(Self {
            disk,
            relation,
            cache: HashMap::new(),
        })
    }

    /// Open (and cache) the physical index for `(table_name, index_name)`,
    /// failing with `UnknownIndex` when no `_indices` rows match.
    pub fn get_index(
        &mut self,
        table_name: &str,
        index_name: &str,
    ) -> DbResult<&mut dyn DbIndex> {
        let key = (table_name.to_string(), index_name.to_string());
        if !self.cache.contains_key(&key) {
            let mut filter = Row::new();
            filter.set("table_name", table_name);
            filter.set("index_name", index_name);
            let handles = self.relation.select(Some(&filter))?;
            if handles.is_empty() {
                return Err(DbRelationError::UnknownIndex(
                    index_name.to_string(),
                    table_name.to_string(),
                ));
            }

            let projected = [
                "column_name".to_string(),
                "seq_in_index".to_string(),
                "index_type".to_string(),
                "is_unique".to_string(),
            ];
            let mut key_columns = Vec::with_capacity(handles.len());
            let mut index_type = String::new();
            let mut unique = false;
            for handle in handles {
                let row = self.relation.project(handle, &projected)?;
                key_columns.push((
                    row.get("seq_in_index")?.as_int()?,
                    row.get("column_name")?.as_text()?.to_string(),
                ));
                index_type = row.get("index_type")?.as_text()?.to_string();
                unique = row.get("is_unique")?.as_bool()?;
            }
            key_columns.sort_by_key(|(seq, _)| *seq);
            let key_columns = key_columns.into_iter().map(|(_, column)| column).collect();

            log::debug!(
                "opening {} index '{}' on '{}'",
                index_type,
                index_name,
                table_name
            );
            let mut index = BTreeIndex::new(
                self.disk.index_path(table_name, index_name),
                index_name,
                key_columns,
                unique,
            );
            index.open()?;
            self.cache.insert(key.clone(), index);
        }
        Ok(self.cache.get_mut(&key).unwrap())
    }

    /// Distinct index names on `table_name`, in insertion order.
    pub fn get_index_names(&mut self, table_name: &str) -> DbResult<Vec<String>> {
        let mut filter = Row::new();
        filter.set("table_name", table_name);
        let projected = ["index_name".to_string()];

        let mut names: Vec<String> = Vec::new();
        for handle in self.relation.select(Some(&filter))? {
            let row = self.relation.project(handle, &projected)?;
            let name = row.get("index_name")?.as_text()?.to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Append an `_indices` row, which must carry `table_name` and
    /// `index_name`.
    pub fn insert(&mut self, row: &Row) -> DbResult<SlotId> {
        row.get("table_name")?;
        row.get("index_name")?;
        self.relation.insert(row)
    }

    pub fn del(&mut self, handle: SlotId) -> DbResult<()> {
        self.relation.del(handle)
    }

    pub fn select(&mut self, predicate: Option<&Row>) -> DbResult<Vec<SlotId>> {
        self.relation.select(predicate)
    }

    pub fn project(&mut self, handle: SlotId, columns: &[String]) -> DbResult<Row> {
        self.relation.project(handle, columns)
    }

    /// Forget a cached physical index, e.g. after its drop. A later
    /// `get_index` re-consults the catalog rows.
    pub fn release(&mut self, table_name: &str, index_name: &str) {
        self.cache
            .remove(&(table_name.to_string(), index_name.to_string()));
    }
}
