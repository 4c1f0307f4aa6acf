//! Shared constants used across Sözlük crates.

/// Default API port for the Sözlük server.
pub const DEFAULT_PORT: u16 = 38420;

/// Folder under the remote base URL that holds the offline dictionary files.
pub const DEFAULT_DATA_FOLDER: &str = "offline";

/// Manifest file name inside the remote data folder.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Queries shorter than this (in characters) never reach storage.
pub const AUTOCOMPLETE_MIN_QUERY_CHARS: usize = 2;
/// Default number of autocomplete suggestions.
pub const DEFAULT_AUTOCOMPLETE_LIMIT: usize = 10;
/// Hard upper bound on autocomplete suggestions per query.
pub const MAX_AUTOCOMPLETE_LIMIT: usize = 50;
/// Upper bound on index entries the mid-word fallback inspects per query.
pub const AUTOCOMPLETE_SUBSTRING_SCAN_CAP: usize = 16_384;

/// Freshness window for ancillary query caches (24 hours).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Icon shown on push notifications.
pub const NOTIFICATION_ICON_PATH: &str = "/icons/icon-192x192.png";

/// Request header carrying public API keys.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Request header carrying the administrator key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";
