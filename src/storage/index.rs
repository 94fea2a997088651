//! Secondary indices for ShaleDB
//!
//! An index maps composite keys to row handles. The ordered map lives in
//! memory and is persisted per index as a JSON snapshot next to the heap
//! files.

use super::heap::SlotId;
use super::relation::DbRelation;
use super::row::{Row, Value};
use crate::error::{DbRelationError, DbResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Composite key of an index entry, compared column by column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexKey(pub Vec<Value>);

/// Capability set every index backend provides.
pub trait DbIndex {
    /// Create the physical index. Fails if it already exists.
    fn create(&mut self) -> DbResult<()>;
    /// Remove the physical index.
    fn drop(&mut self) -> DbResult<()>;
    /// Index every existing row of `relation`.
    fn build_from(&mut self, relation: &mut dyn DbRelation) -> DbResult<()>;
    /// Index one row under its key.
    fn insert(&mut self, row: &Row, handle: SlotId) -> DbResult<()>;
    /// Handles stored under `key`.
    fn lookup(&mut self, key: &IndexKey) -> DbResult<Vec<SlotId>>;
}

/// Ordered-map index with JSON snapshot persistence.
#[derive(Debug)]
pub struct BTreeIndex {
    path: PathBuf,
    name: String,
    key_columns: Vec<String>,
    unique: bool,
    entries: BTreeMap<IndexKey, Vec<SlotId>>,
}

/// Serializable snapshot of the index contents.
#[derive(Serialize, Deserialize)]
struct IndexData {
    entries: Vec<(IndexKey, Vec<SlotId>)>,
}

impl BTreeIndex {
    pub fn new(
        path: PathBuf,
        name: impl Into<String>,
        key_columns: Vec<String>,
        unique: bool,
    ) -> Self {
        Self {
            path,
            name: name.into(),
            key_columns,
            unique,
            entries: BTreeMap::new(),
        }
    }

    /// Load the snapshot when the index file exists; a missing file means
    /// the index has not been physically created yet.
    pub fn open(&mut self) -> DbResult<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let file = std::fs::File::open(&self.path)?;
        let data: IndexData = serde_json::from_reader(file).map_err(|e| {
            DbRelationError::Storage(format!(
                "corrupt index file '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        self.entries = data.entries.into_iter().collect();
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// The key of `row` under this index.
    pub fn key_for(&self, row: &Row) -> DbResult<IndexKey> {
        let mut values = Vec::with_capacity(self.key_columns.len());
        for column in &self.key_columns {
            values.push(row.get(column)?.clone());
        }
        Ok(IndexKey(values))
    }

    fn save(&self) -> DbResult<()> {
        let data = IndexData {
            entries: self
                .entries
                .iter()
                .map(|(key, handles)| (key.clone(), handles.clone()))
                .collect(),
        };
        let file = std::fs::File::create(&self.path)?;
        serde_json::to_writer(file, &data).map_err(|e| {
            DbRelationError::Storage(format!(
                "could not write index file '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }
}

impl DbIndex for BTreeIndex {
    fn create(&mut self) -> DbResult<()> {
        if self.path.exists() {
            return Err(DbRelationError::Storage(format!(
                "index file '{}' already exists",
                self.path.display()
            )));
        }
        log::debug!("creating index '{}'", self.name);
        self.entries.clear();
        self.save()
    }

    fn drop(&mut self) -> DbResult<()> {
        log::debug!("dropping index '{}'", self.name);
        self.entries.clear();
        std::fs::remove_file(&self.path)?;
        Ok(())
    }

    fn build_from(&mut self, relation: &mut dyn DbRelation) -> DbResult<()> {
        let columns = relation.column_names().to_vec();
        for handle in relation.select(None)? {
            let row = relation.project(handle, &columns)?;
            self.insert(&row, handle)?;
        }
        Ok(())
    }

    fn insert(&mut self, row: &Row, handle: SlotId) -> DbResult<()> {
        let key = self.key_for(row)?;
        let handles = self.entries.entry(key).or_default();
        if self.unique && !handles.is_empty() {
            return Err(DbRelationError::DuplicateKey(self.name.clone()));
        }
        handles.push(handle);
        self.save()
    }

    fn lookup(&mut self, key: &IndexKey) -> DbResult<Vec<SlotId>> {
        Ok(self.entries.get(key).cloned().unwrap_or_default())
    }
}
