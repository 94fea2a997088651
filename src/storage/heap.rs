//! Heap file storage for ShaleDB
//!
//! A heap file stores tuples in no particular order across slotted pages.
//! Scans visit pages then slots in order, so scan order is insertion
//! order.

use super::disk::DiskManager;
use super::page::{Page, PageId, PAGE_HEADER_SIZE, PAGE_SIZE};
use crate::error::{DbRelationError, DbResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Opaque identifier of a stored row (page number, slot within the page).
/// Stable until the row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId {
    pub page_id: PageId,
    pub slot: u16,
}

impl SlotId {
    pub fn new(page_id: PageId, slot: u16) -> Self {
        Self { page_id, slot }
    }
}

/// Largest tuple a single page can hold.
pub const MAX_TUPLE_SIZE: usize = PAGE_SIZE - PAGE_HEADER_SIZE - 4;

/// Heap file over slotted pages.
#[derive(Debug)]
pub struct HeapFile {
    disk: Arc<DiskManager>,
    name: String,
    /// Last page ID (for fast insertion)
    last_page_id: PageId,
}

impl HeapFile {
    pub fn new(disk: Arc<DiskManager>, name: impl Into<String>) -> Self {
        Self {
            disk,
            name: name.into(),
            last_page_id: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the backing file exists on disk.
    pub fn exists(&self) -> bool {
        self.disk.exists(&self.name)
    }

    /// Create the backing file with one empty page. Fails if it exists.
    pub fn create(&mut self) -> DbResult<()> {
        self.disk.create_file(&self.name)?;
        let page_id = self.disk.allocate_page(&self.name)?;
        self.write_page(page_id, &Page::new())?;
        self.last_page_id = page_id;
        Ok(())
    }

    /// Open the backing file, which must exist and hold at least one page.
    pub fn open(&mut self) -> DbResult<()> {
        let page_count = self.disk.page_count(&self.name)?;
        if page_count == 0 {
            return Err(DbRelationError::Storage(format!(
                "heap file '{}' has no pages",
                self.name
            )));
        }
        self.last_page_id = page_count - 1;
        Ok(())
    }

    /// Remove the backing file.
    pub fn drop_file(&mut self) -> DbResult<()> {
        self.disk.remove_file(&self.name)
    }

    /// Insert a tuple, appending a page when the last one is full.
    pub fn insert(&mut self, tuple: &[u8]) -> DbResult<SlotId> {
        if tuple.len() > MAX_TUPLE_SIZE {
            return Err(DbRelationError::Storage(format!(
                "row of {} bytes does not fit in a page",
                tuple.len()
            )));
        }

        let mut page = self.read_page(self.last_page_id)?;
        if let Some(slot) = page.insert(tuple) {
            self.write_page(self.last_page_id, &page)?;
            return Ok(SlotId::new(self.last_page_id, slot));
        }

        // Current page full, start a new one
        let page_id = self.disk.allocate_page(&self.name)?;
        let mut page = Page::new();
        let slot = page.insert(tuple).ok_or_else(|| {
            DbRelationError::Storage("failed to insert into a fresh page".to_string())
        })?;
        self.write_page(page_id, &page)?;
        self.last_page_id = page_id;
        Ok(SlotId::new(page_id, slot))
    }

    /// Get a tuple by handle; `None` when the row was deleted.
    pub fn get(&self, handle: SlotId) -> DbResult<Option<Vec<u8>>> {
        if handle.page_id > self.last_page_id {
            return Ok(None);
        }
        let page = self.read_page(handle.page_id)?;
        Ok(page.get(handle.slot).map(<[u8]>::to_vec))
    }

    /// Delete a tuple by handle.
    pub fn delete(&mut self, handle: SlotId) -> DbResult<()> {
        let mut page = self.read_page(handle.page_id)?;
        if !page.delete(handle.slot) {
            return Err(DbRelationError::Storage(format!(
                "no row at {:?} in '{}'",
                handle, self.name
            )));
        }
        self.write_page(handle.page_id, &page)
    }

    /// All live tuples in insertion order.
    pub fn scan(&self) -> DbResult<Vec<(SlotId, Vec<u8>)>> {
        let mut tuples = Vec::new();
        for page_id in 0..=self.last_page_id {
            let page = self.read_page(page_id)?;
            for slot in 0..page.slot_count() {
                if let Some(bytes) = page.get(slot) {
                    tuples.push((SlotId::new(page_id, slot), bytes.to_vec()));
                }
            }
        }
        Ok(tuples)
    }

    fn read_page(&self, page_id: PageId) -> DbResult<Page> {
        let mut buf = vec![0u8; PAGE_SIZE];
        self.disk.read_page(&self.name, page_id, &mut buf)?;
        Ok(Page::from_bytes(&buf))
    }

    fn write_page(&self, page_id: PageId, page: &Page) -> DbResult<()> {
        self.disk.write_page(&self.name, page_id, page.data())
    }
}
