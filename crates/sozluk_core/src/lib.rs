//! Core domain library for Sözlük (config, storage, sync, search, gamification).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// redb-backed local store.
pub mod db;
/// Application error types (storage/domain).
pub mod error;
/// Point table and badge rule evaluation.
pub mod gamification;
/// Data models for persistence and the HTTP API.
pub mod models;
/// Offline request routing and push notifications.
pub mod offline;
/// Turkish-aware autocomplete.
pub mod search;
/// Versioned dictionary download pipeline.
pub mod sync;
/// Turkish text folding.
pub mod text;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::{DEFAULT_PORT, MAX_AUTOCOMPLETE_LIMIT};
pub use db::Database;
pub use error::AppError;
pub use sync::{SyncManager, SyncStatus};
