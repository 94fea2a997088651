//! Disk manager for ShaleDB
//!
//! Page-granular file I/O for relations. Every relation lives in its own
//! file under the data directory; file handles are opened lazily and kept
//! for the life of the manager.

use crate::error::{DbRelationError, DbResult};
use crate::storage::page::{PageId, PAGE_SIZE};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Disk manager shared by every relation of one database directory.
#[derive(Debug)]
pub struct DiskManager {
    /// Directory where data files are stored
    data_dir: PathBuf,
    /// File handles for open relations, by relation name
    open_files: Mutex<HashMap<String, File>>,
}

impl DiskManager {
    /// Create a manager over `data_dir`, creating the directory if needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> DbResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            open_files: Mutex::new(HashMap::new()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn relation_path(&self, relation: &str) -> PathBuf {
        self.data_dir.join(format!("{}.tbl", relation))
    }

    /// Path of the physical index file for `index_name` on `table_name`.
    pub fn index_path(&self, table_name: &str, index_name: &str) -> PathBuf {
        self.data_dir.join(format!("{}-{}.idx", table_name, index_name))
    }

    /// Whether the backing file for `relation` exists.
    pub fn exists(&self, relation: &str) -> bool {
        self.relation_path(relation).exists()
    }

    /// Create the backing file for `relation`. Fails if it already exists.
    pub fn create_file(&self, relation: &str) -> DbResult<()> {
        let path = self.relation_path(relation);
        if path.exists() {
            return Err(DbRelationError::Storage(format!(
                "file '{}' already exists",
                path.display()
            )));
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        self.open_files
            .lock()
            .unwrap()
            .insert(relation.to_string(), file);
        Ok(())
    }

    /// Remove the backing file for `relation`.
    pub fn remove_file(&self, relation: &str) -> DbResult<()> {
        self.open_files.lock().unwrap().remove(relation);
        std::fs::remove_file(self.relation_path(relation))?;
        Ok(())
    }

    pub fn read_page(&self, relation: &str, page_id: PageId, buf: &mut [u8]) -> DbResult<()> {
        let mut open_files = self.open_files.lock().unwrap();
        let file = self.file_mut(&mut open_files, relation)?;
        file.seek(SeekFrom::Start(page_id as u64 * PAGE_SIZE as u64))?;
        file.read_exact(buf)?;
        Ok(())
    }

    pub fn write_page(&self, relation: &str, page_id: PageId, data: &[u8]) -> DbResult<()> {
        let mut open_files = self.open_files.lock().unwrap();
        let file = self.file_mut(&mut open_files, relation)?;
        file.seek(SeekFrom::Start(page_id as u64 * PAGE_SIZE as u64))?;
        file.write_all(data)?;
        file.flush()?;
        Ok(())
    }

    /// Extend the file by one zeroed page and return its ID.
    pub fn allocate_page(&self, relation: &str) -> DbResult<PageId> {
        let mut open_files = self.open_files.lock().unwrap();
        let file = self.file_mut(&mut open_files, relation)?;
        let file_len = file.metadata()?.len();
        let page_id = (file_len / PAGE_SIZE as u64) as PageId;

        file.seek(SeekFrom::End(0))?;
        let zero_page = vec![0u8; PAGE_SIZE];
        file.write_all(&zero_page)?;
        file.flush()?;

        Ok(page_id)
    }

    pub fn page_count(&self, relation: &str) -> DbResult<u32> {
        let mut open_files = self.open_files.lock().unwrap();
        let file = self.file_mut(&mut open_files, relation)?;
        let file_len = file.metadata()?.len();
        Ok((file_len / PAGE_SIZE as u64) as u32)
    }

    fn file_mut<'a>(
        &self,
        open_files: &'a mut HashMap<String, File>,
        relation: &str,
    ) -> DbResult<&'a mut File> {
        if !open_files.contains_key(relation) {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .open(self.relation_path(relation))?;
            open_files.insert(relation.to_string(), file);
        }
        Ok(open_files.get_mut(relation).unwrap())
    }
}
