//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Dictionary entries keyed by `(generation, name)` (`WordRecord`, bincode-encoded).
pub const WORDS: TableDefinition<(u64, &str), &[u8]> = TableDefinition::new("words");
/// Autocomplete index keyed by `(generation, folded name, name)`.
pub const WORDS_BY_KEY: TableDefinition<(u64, &str, &str), ()> =
    TableDefinition::new("words_by_key");
/// Scalar sync markers (version, autocomplete version, generation pointers).
pub const SYNC_META: TableDefinition<&str, u64> = TableDefinition::new("sync_meta");
/// Ancillary query results (`CacheEntry`, JSON-encoded).
pub const QUERY_CACHE: TableDefinition<&str, &[u8]> = TableDefinition::new("query_cache");

/// Badge definitions keyed by slug (`Badge`, JSON-encoded).
pub const BADGES: TableDefinition<&str, &[u8]> = TableDefinition::new("badges");
/// Awards keyed by `(user_id, slug)` (`UserBadge`, JSON-encoded).
pub const USER_BADGES: TableDefinition<(&str, &str), &[u8]> = TableDefinition::new("user_badges");
/// Per-user totals (`UserStats`, bincode-encoded).
pub const USER_STATS: TableDefinition<&str, &[u8]> = TableDefinition::new("user_stats");
/// Contribution event ids already applied, with the apply time in millis.
pub const APPLIED_CONTRIBUTIONS: TableDefinition<&str, u64> =
    TableDefinition::new("applied_contributions");

/// `SYNC_META` key: committed data version.
pub const META_DATA_VERSION: &str = "data_version";
/// `SYNC_META` key: version tag of the autocomplete list.
pub const META_AUTOCOMPLETE_VERSION: &str = "autocomplete_version";
/// `SYNC_META` key: generation readers should use.
pub const META_ACTIVE_GENERATION: &str = "active_generation";
/// `SYNC_META` key: last generation number handed out.
pub const META_LAST_GENERATION: &str = "last_generation";
