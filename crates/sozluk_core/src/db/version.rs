//! Local data-version registry.
//!
//! The registry is a handful of scalar rows in `SYNC_META`. Writers go through
//! [`super::dictionary::DictionaryDb`] so that the version marker, the
//! autocomplete tag, and the active generation always change in one commit.

use super::tables::{META_AUTOCOMPLETE_VERSION, META_DATA_VERSION, SYNC_META};
use crate::error::AppError;
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

pub(super) fn read_marker<T>(table: &T, key: &str) -> Result<Option<u64>, AppError>
where
    T: ReadableTable<&'static str, u64>,
{
    Ok(table.get(key)?.map(|guard| guard.value()))
}

/// Read access to the committed data version.
pub struct VersionRegistry {
    db: Arc<redb::Database>,
}

impl VersionRegistry {
    /// Initialize the marker table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(SYNC_META)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Committed data version, or `None` when nothing was ever downloaded.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn local_version(&self) -> Result<Option<u64>, AppError> {
        self.marker(META_DATA_VERSION)
    }

    /// Version tag of the autocomplete list.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn autocomplete_version(&self) -> Result<Option<u64>, AppError> {
        self.marker(META_AUTOCOMPLETE_VERSION)
    }

    fn marker(&self, key: &str) -> Result<Option<u64>, AppError> {
        let read_txn = self.db.begin_read()?;
        let meta = read_txn.open_table(SYNC_META)?;
        read_marker(&meta, key)
    }
}
