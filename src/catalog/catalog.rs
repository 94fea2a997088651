//! The system catalog: `Tables` and `Indices` under one owner.

use super::indices::Indices;
use super::schema;
use super::tables::Tables;
use crate::error::DbResult;
use crate::storage::DiskManager;
use std::path::PathBuf;
use std::sync::Arc;

/// Owns the catalog relations and the disk manager they share. One value
/// per database directory; callers keep it for the process lifetime
/// instead of going through globals.
#[derive(Debug)]
pub struct Catalog {
    pub tables: Tables,
    pub indices: Indices,
}

impl Catalog {
    /// Open the catalog under `data_dir`, creating and seeding the system
    /// relations on first use.
    pub fn open(data_dir: impl Into<PathBuf>) -> DbResult<Self> {
        let disk = Arc::new(DiskManager::new(data_dir)?);
        let tables = Tables::new(disk.clone())?;
        let indices = Indices::new(disk)?;
        Ok(Self { tables, indices })
    }

    /// True for the three relations that describe the catalog itself.
    pub fn is_schema_table(name: &str) -> bool {
        schema::is_schema_table(name)
    }
}
