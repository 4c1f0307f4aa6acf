//! Local structured store for Sözlük, backed by redb.

/// Ancillary query cache.
pub mod cache;
/// Generation-scoped dictionary and autocomplete tables.
pub mod dictionary;
/// Badges, awards, and contribution totals.
pub mod gamification;
/// redb table definitions.
pub mod tables;
mod time_util;
/// Data-version registry.
pub mod version;

use crate::error::AppError;
use std::path::Path;
use std::sync::Arc;

/// Database handle with typed accessors over a shared redb instance.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub dictionary: dictionary::DictionaryDb,
    pub versions: version::VersionRegistry,
    pub cache: cache::QueryCacheDb,
    pub gamification: gamification::GamificationDb,
}

#[cfg(test)]
mod tests;

impl Database {
    /// Build a database handle from an existing shared redb instance.
    ///
    /// # Returns
    /// A new [`Database`] wrapper that shares the underlying redb instance.
    ///
    /// # Errors
    /// Returns an error if the required tables cannot be created.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            dictionary: dictionary::DictionaryDb::new(db.clone())?,
            versions: version::VersionRegistry::new(db.clone())?,
            cache: cache::QueryCacheDb::new(db.clone())?,
            gamification: gamification::GamificationDb::new(db.clone())?,
            db,
        })
    }

    /// Open (or create) the store under directory `path`.
    ///
    /// Rows left behind by an interrupted ingest run are purged before the
    /// handle is returned.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or redb cannot
    /// open the file.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                dir.display(),
                err
            ))
        })?;

        let file = dir.join(tables::REDB_FILE_NAME);
        let db = match redb::Database::create(&file) {
            Ok(db) => Arc::new(db),
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(AppError::StorageMessage(format!(
                    "Database '{}' is already open in another process.\n\
                    Close it first, or set DB_PATH to use a different location.",
                    file.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };

        let database = Self::from_shared(db)?;
        let purged = database.dictionary.purge_inactive()?;
        if purged > 0 {
            tracing::warn!(
                "Purged {} words left by an interrupted sync in {}",
                purged,
                file.display()
            );
        }
        Ok(database)
    }
}
