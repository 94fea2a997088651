//! Relations for ShaleDB
//!
//! A relation couples a column schema with a heap file and marshals rows
//! to and from the page tuple layout in declared column order.

use super::disk::DiskManager;
use super::heap::{HeapFile, SlotId};
use super::row::{Row, Value};
use crate::catalog::DataType;
use crate::error::{DbRelationError, DbResult};
use std::sync::Arc;

/// Capability set every relation backend provides to the catalog and the
/// DDL executor.
pub trait DbRelation {
    fn name(&self) -> &str;
    fn column_names(&self) -> &[String];
    fn column_types(&self) -> &[DataType];
    /// Create the physical relation. Fails if it already exists.
    fn create(&mut self) -> DbResult<()>;
    /// Create the physical relation, or open it if it already exists.
    fn create_if_not_exists(&mut self) -> DbResult<()>;
    /// Remove the physical relation.
    fn drop(&mut self) -> DbResult<()>;
    /// Append a row, returning a handle stable until deletion.
    fn insert(&mut self, row: &Row) -> DbResult<SlotId>;
    /// Handles of every row matching the equality `predicate`, in
    /// insertion order. `None` selects everything.
    fn select(&mut self, predicate: Option<&Row>) -> DbResult<Vec<SlotId>>;
    /// Read the given columns of the row behind `handle`.
    fn project(&mut self, handle: SlotId, columns: &[String]) -> DbResult<Row>;
    /// Delete the row behind `handle`.
    fn del(&mut self, handle: SlotId) -> DbResult<()>;
}

/// Heap-file backed relation.
#[derive(Debug)]
pub struct HeapTable {
    column_names: Vec<String>,
    column_types: Vec<DataType>,
    heap: HeapFile,
}

impl HeapTable {
    pub fn new(
        disk: Arc<DiskManager>,
        name: impl Into<String>,
        column_names: Vec<String>,
        column_types: Vec<DataType>,
    ) -> Self {
        Self {
            column_names,
            column_types,
            heap: HeapFile::new(disk, name),
        }
    }

    /// Open the existing backing file.
    pub fn open(&mut self) -> DbResult<()> {
        self.heap.open()
    }

    /// Serialize a row in declared column order: INT as 4-byte LE, TEXT
    /// as length-prefixed UTF-8, BOOLEAN as one byte.
    fn marshal(&self, row: &Row) -> DbResult<Vec<u8>> {
        let mut bytes = Vec::new();
        for (name, data_type) in self.column_names.iter().zip(&self.column_types) {
            let value = row.get(name)?;
            match (data_type, value) {
                (DataType::Int, Value::Int(n)) => bytes.extend_from_slice(&n.to_le_bytes()),
                (DataType::Text, Value::Text(s)) => {
                    bytes.extend_from_slice(&(s.len() as u32).to_le_bytes());
                    bytes.extend_from_slice(s.as_bytes());
                }
                (DataType::Boolean, Value::Boolean(b)) => bytes.push(*b as u8),
                (expected, found) => {
                    return Err(DbRelationError::TypeMismatch {
                        expected: expected.to_string(),
                        found: found.data_type().to_string(),
                    })
                }
            }
        }
        Ok(bytes)
    }

    fn unmarshal(&self, bytes: &[u8]) -> DbResult<Row> {
        let mut row = Row::new();
        let mut offset = 0usize;
        for (name, data_type) in self.column_names.iter().zip(&self.column_types) {
            let value = match data_type {
                DataType::Int => {
                    let raw = bytes
                        .get(offset..offset + 4)
                        .ok_or_else(|| self.corrupt())?;
                    offset += 4;
                    Value::Int(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
                }
                DataType::Text => {
                    let raw = bytes
                        .get(offset..offset + 4)
                        .ok_or_else(|| self.corrupt())?;
                    let len = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
                    offset += 4;
                    let raw = bytes
                        .get(offset..offset + len)
                        .ok_or_else(|| self.corrupt())?;
                    offset += len;
                    Value::Text(String::from_utf8(raw.to_vec()).map_err(|_| self.corrupt())?)
                }
                DataType::Boolean => {
                    let raw = bytes.get(offset).ok_or_else(|| self.corrupt())?;
                    offset += 1;
                    Value::Boolean(*raw != 0)
                }
            };
            row.set(name.clone(), value);
        }
        Ok(row)
    }

    fn corrupt(&self) -> DbRelationError {
        DbRelationError::Storage(format!("corrupt row in relation '{}'", self.heap.name()))
    }
}

impl DbRelation for HeapTable {
    fn name(&self) -> &str {
        self.heap.name()
    }

    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    fn column_types(&self) -> &[DataType] {
        &self.column_types
    }

    fn create(&mut self) -> DbResult<()> {
        log::debug!("creating relation '{}'", self.name());
        self.heap.create()
    }

    fn create_if_not_exists(&mut self) -> DbResult<()> {
        if self.heap.exists() {
            self.heap.open()
        } else {
            self.create()
        }
    }

    fn drop(&mut self) -> DbResult<()> {
        log::debug!("dropping relation '{}'", self.name());
        self.heap.drop_file()
    }

    fn insert(&mut self, row: &Row) -> DbResult<SlotId> {
        let bytes = self.marshal(row)?;
        self.heap.insert(&bytes)
    }

    fn select(&mut self, predicate: Option<&Row>) -> DbResult<Vec<SlotId>> {
        let mut handles = Vec::new();
        for (handle, bytes) in self.heap.scan()? {
            match predicate {
                Some(filter) => {
                    if self.unmarshal(&bytes)?.matches(filter) {
                        handles.push(handle);
                    }
                }
                None => handles.push(handle),
            }
        }
        Ok(handles)
    }

    fn project(&mut self, handle: SlotId, columns: &[String]) -> DbResult<Row> {
        let bytes = self.heap.get(handle)?.ok_or_else(|| {
            DbRelationError::Storage(format!("no row at {:?} in '{}'", handle, self.name()))
        })?;
        let full = self.unmarshal(&bytes)?;
        let mut row = Row::new();
        for column in columns {
            row.set(column.clone(), full.get(column)?.clone());
        }
        Ok(row)
    }

    fn del(&mut self, handle: SlotId) -> DbResult<()> {
        self.heap.delete(handle)
    }
}
