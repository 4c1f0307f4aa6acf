//! Network-first query resolution that bridges offline gaps from the local
//! query cache.

use crate::error::AppError;
use crate::Database;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrigin {
    Network,
    Cache,
}

/// A query result together with its age and origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedValue {
    pub data: serde_json::Value,
    pub fetched_at: DateTime<Utc>,
    pub origin: ValueOrigin,
}

/// Resolve `key` from the network, falling back to a cached copy.
///
/// A successful fetch overwrites the cache entry. When the network is
/// unreachable ([`AppError::Fetch`]) an entry younger than `ttl` is returned
/// instead; older entries are ignored. Other errors are returned as-is.
///
/// # Errors
/// Returns the fetch error when no fresh cached copy exists, or a storage
/// error while reading or writing the cache.
pub async fn network_or_cached<F, Fut>(
    db: Arc<Database>,
    key: &str,
    ttl: Duration,
    fetch: F,
) -> Result<ResolvedValue, AppError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<serde_json::Value, AppError>>,
{
    let owned_key = key.to_string();
    match fetch().await {
        Ok(data) => {
            let fetched_at = Utc::now();
            let stored = data.clone();
            let store_db = db.clone();
            tokio::task::spawn_blocking(move || {
                store_db.cache.put(&owned_key, stored, fetched_at)
            })
            .await??;
            Ok(ResolvedValue {
                data,
                fetched_at,
                origin: ValueOrigin::Network,
            })
        }
        Err(err @ AppError::Fetch(_)) => {
            tracing::warn!("Fetch for '{}' failed, trying cache: {}", key, err);
            let cached = tokio::task::spawn_blocking(move || {
                db.cache.get_fresh(&owned_key, ttl, Utc::now())
            })
            .await??;
            match cached {
                Some(entry) => Ok(ResolvedValue {
                    data: entry.data,
                    fetched_at: entry.fetched_at,
                    origin: ValueOrigin::Cache,
                }),
                None => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_temp_db;
    use serde_json::json;

    #[tokio::test]
    async fn network_success_refreshes_cache() {
        let (db, _temp) = setup_temp_db();
        let db = Arc::new(db);
        let resolved = network_or_cached(db.clone(), "popular", Duration::hours(24), || async {
            Ok(json!(["ahlak", "kitap"]))
        })
        .await
        .expect("resolve");
        assert_eq!(resolved.origin, ValueOrigin::Network);

        let cached = db.cache.get("popular").expect("get").expect("entry");
        assert_eq!(cached.data, json!(["ahlak", "kitap"]));
    }

    #[tokio::test]
    async fn network_failure_serves_fresh_cache() {
        let (db, _temp) = setup_temp_db();
        let db = Arc::new(db);
        db.cache
            .put("popular", json!(["yedek"]), Utc::now() - Duration::hours(2))
            .expect("seed");

        let resolved = network_or_cached(db.clone(), "popular", Duration::hours(24), || async {
            Err(AppError::Fetch("offline".to_string()))
        })
        .await
        .expect("cache fallback");
        assert_eq!(resolved.origin, ValueOrigin::Cache);
        assert_eq!(resolved.data, json!(["yedek"]));
    }

    #[tokio::test]
    async fn network_failure_with_stale_cache_surfaces_error() {
        let (db, _temp) = setup_temp_db();
        let db = Arc::new(db);
        db.cache
            .put("popular", json!(["bayat"]), Utc::now() - Duration::hours(30))
            .expect("seed");

        let err = network_or_cached(db, "popular", Duration::hours(24), || async {
            Err(AppError::Fetch("offline".to_string()))
        })
        .await
        .expect_err("stale cache is not served");
        assert!(matches!(err, AppError::Fetch(_)));
    }

    #[tokio::test]
    async fn non_network_errors_skip_the_cache() {
        let (db, _temp) = setup_temp_db();
        let db = Arc::new(db);
        db.cache
            .put("word:ahlak", json!({ "name": "ahlak" }), Utc::now())
            .expect("seed");

        let err = network_or_cached(db, "word:ahlak", Duration::hours(24), || async {
            Err(AppError::Unauthorized)
        })
        .await
        .expect_err("auth errors are not masked");
        assert!(matches!(err, AppError::Unauthorized));
    }
}
