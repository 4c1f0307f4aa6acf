//! Short-lived cache for ancillary query results (popular words and the like).

use super::tables::QUERY_CACHE;
use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use redb::ReadableDatabase;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One cached query result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub data: serde_json::Value,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Whether the entry is younger than `ttl` at `now`.
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at) < ttl
    }
}

/// Accessor for the `query_cache` table.
pub struct QueryCacheDb {
    db: Arc<redb::Database>,
}

impl QueryCacheDb {
    /// Initialize the cache table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(QUERY_CACHE)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Store `data` under `key`, overwriting any previous entry.
    ///
    /// # Errors
    /// Returns an error when serialization or storage fails.
    pub fn put(
        &self,
        key: &str,
        data: serde_json::Value,
        fetched_at: DateTime<Utc>,
    ) -> Result<CacheEntry, AppError> {
        let entry = CacheEntry {
            key: key.to_string(),
            data,
            fetched_at,
        };
        let encoded = serde_json::to_vec(&entry)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(QUERY_CACHE)?;
            table.insert(key, encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(entry)
    }

    /// Fetch the entry for `key` regardless of age.
    ///
    /// # Errors
    /// Returns an error when storage access or decoding fails.
    pub fn get(&self, key: &str) -> Result<Option<CacheEntry>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(QUERY_CACHE)?;
        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Fetch the entry for `key` only when it is younger than `ttl`.
    ///
    /// # Errors
    /// Returns an error when storage access or decoding fails.
    pub fn get_fresh(
        &self,
        key: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Option<CacheEntry>, AppError> {
        Ok(self.get(key)?.filter(|entry| entry.is_fresh(ttl, now)))
    }
}
