//! Executes routing decisions against a network and a response cache.

use super::routes::{decide, Request, RouteDecision, Strategy, OFFLINE_FALLBACK_PATH, PRECACHE};
use crate::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Minimal HTTP response as seen by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            location: None,
            body: body.into(),
        }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: 302,
            location: Some(location.into()),
            body: Vec::new(),
        }
    }

    /// Empty `503` returned when nothing can serve the request.
    pub fn empty_error() -> Self {
        Self {
            status: 503,
            location: None,
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Upstream fetcher. `Err` means the network is unreachable.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Response, AppError>;
}

/// Named response buckets keyed by path.
pub trait ResponseCache: Send + Sync {
    fn get(&self, cache: &str, key: &str) -> Option<Response>;
    fn put(&self, cache: &str, key: &str, response: Response);
}

/// In-process [`ResponseCache`].
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<(String, String), Response>>,
}

impl ResponseCache for MemoryCache {
    fn get(&self, cache: &str, key: &str) -> Option<Response> {
        let entries = self.entries.lock().ok()?;
        entries.get(&(cache.to_string(), key.to_string())).cloned()
    }

    fn put(&self, cache: &str, key: &str, response: Response) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert((cache.to_string(), key.to_string()), response);
        }
    }
}

/// Serves intercepted requests while the client may be offline.
#[derive(Clone)]
pub struct OfflineRouter {
    network: Arc<dyn Network>,
    cache: Arc<dyn ResponseCache>,
}

impl OfflineRouter {
    pub fn new(network: Arc<dyn Network>, cache: Arc<dyn ResponseCache>) -> Self {
        Self { network, cache }
    }

    /// Store the app shell pages that must be available offline.
    pub fn precache(&self, pages: impl IntoIterator<Item = (String, Response)>) {
        for (path, response) in pages {
            self.cache.put(PRECACHE, &path, response);
        }
    }

    /// Serve `request`, never failing: every dead end becomes an empty 503.
    pub async fn handle(&self, request: &Request, online: bool) -> Response {
        let decision = decide(request, online);
        tracing::debug!("{} -> {:?}", request.path, decision);
        match decision {
            RouteDecision::Redirect { location } => Response::redirect(location),
            RouteDecision::NetworkOnly => self
                .network(&request.path)
                .await
                .unwrap_or_else(Response::empty_error),
            RouteDecision::NetworkThenPrecache { fallbacks } => {
                if let Some(response) = self.network(&request.path).await {
                    return response;
                }
                fallbacks
                    .iter()
                    .find_map(|key| self.cache.get(PRECACHE, key))
                    .unwrap_or_else(Response::empty_error)
            }
            RouteDecision::PrecacheFirst { key } => {
                if let Some(response) = self.cache.get(PRECACHE, &key) {
                    return response;
                }
                if let Some(response) = self.network(&request.path).await {
                    return response;
                }
                self.cache
                    .get(PRECACHE, OFFLINE_FALLBACK_PATH)
                    .unwrap_or_else(Response::empty_error)
            }
            RouteDecision::Runtime { strategy, cache } => {
                self.runtime(strategy, &cache, &request.path).await
            }
        }
    }

    /// Network response, or `None` when the fetch itself failed.
    async fn network(&self, path: &str) -> Option<Response> {
        match self.network.fetch(path).await {
            Ok(response) => Some(response),
            Err(err) => {
                tracing::debug!("Network fetch for {} failed: {}", path, err);
                None
            }
        }
    }

    async fn fetch_and_store(&self, cache: &str, path: &str) -> Option<Response> {
        let response = self.network(path).await?;
        if response.is_success() {
            self.cache.put(cache, path, response.clone());
        }
        Some(response)
    }

    async fn runtime(&self, strategy: Strategy, cache: &str, path: &str) -> Response {
        match strategy {
            Strategy::CacheFirst => match self.cache.get(cache, path) {
                Some(hit) => hit,
                None => self
                    .fetch_and_store(cache, path)
                    .await
                    .unwrap_or_else(Response::empty_error),
            },
            Strategy::NetworkFirst => match self.fetch_and_store(cache, path).await {
                Some(response) => response,
                None => self
                    .cache
                    .get(cache, path)
                    .unwrap_or_else(Response::empty_error),
            },
            Strategy::StaleWhileRevalidate => match self.cache.get(cache, path) {
                Some(stale) => {
                    let router = self.clone();
                    let cache = cache.to_string();
                    let path = path.to_string();
                    tokio::spawn(async move {
                        router.fetch_and_store(&cache, &path).await;
                    });
                    stale
                }
                None => self
                    .fetch_and_store(cache, path)
                    .await
                    .unwrap_or_else(Response::empty_error),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeNetwork {
        pages: Mutex<HashMap<String, Response>>,
        down: AtomicBool,
        fetches: AtomicUsize,
    }

    impl FakeNetwork {
        fn serve(&self, path: &str, body: &str) {
            self.pages
                .lock()
                .expect("pages")
                .insert(path.to_string(), Response::ok(body));
        }
    }

    #[async_trait]
    impl Network for FakeNetwork {
        async fn fetch(&self, path: &str) -> Result<Response, AppError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.down.load(Ordering::SeqCst) {
                return Err(AppError::Fetch("offline".to_string()));
            }
            Ok(self.pages.lock().expect("pages").get(path).cloned().unwrap_or(Response {
                status: 404,
                location: None,
                body: Vec::new(),
            }))
        }
    }

    fn router() -> (OfflineRouter, Arc<FakeNetwork>, Arc<MemoryCache>) {
        let network = Arc::new(FakeNetwork::default());
        let cache = Arc::new(MemoryCache::default());
        let router = OfflineRouter::new(network.clone(), cache.clone());
        router.precache([
            ("/en/search".to_string(), Response::ok("search shell")),
            ("/~offline".to_string(), Response::ok("offline page")),
            ("/tr".to_string(), Response::ok("tr home")),
        ]);
        (router, network, cache)
    }

    #[tokio::test]
    async fn offline_turkish_search_is_redirected_without_network() {
        let (router, network, _) = router();
        let response = router
            .handle(&Request::navigation("/tr/arama/ahlak"), false)
            .await;
        assert_eq!(response.status, 302);
        assert_eq!(response.location.as_deref(), Some("/en/search/ahlak"));
        assert_eq!(network.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn online_turkish_search_failure_is_empty_503() {
        let (router, network, _) = router();
        network.down.store(true, Ordering::SeqCst);
        let response = router.handle(&Request::navigation("/tr/arama"), true).await;
        assert_eq!(response, Response::empty_error());
    }

    #[tokio::test]
    async fn english_word_search_serves_shell_when_network_fails() {
        let (router, network, _) = router();
        network.serve("/en/search/kitap", "kitap results");
        let response = router
            .handle(&Request::navigation("/en/search/kitap"), true)
            .await;
        assert_eq!(response.body, b"kitap results");

        network.down.store(true, Ordering::SeqCst);
        let response = router
            .handle(&Request::navigation("/en/search/kitap"), false)
            .await;
        assert_eq!(response.body, b"search shell");
    }

    #[tokio::test]
    async fn uncached_page_falls_back_to_offline_page() {
        let (router, network, _) = router();
        network.down.store(true, Ordering::SeqCst);
        let response = router
            .handle(&Request::navigation("/en/contribute"), false)
            .await;
        assert_eq!(response.body, b"offline page");
    }

    #[tokio::test]
    async fn locale_root_is_served_from_precache() {
        let (router, network, _) = router();
        let response = router.handle(&Request::navigation("/tr/"), true).await;
        assert_eq!(response.body, b"tr home");
        assert_eq!(network.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cache_first_assets_hit_network_once() {
        let (router, network, _) = router();
        network.serve("/fonts/inter.woff2", "font");
        let request = Request::asset("/fonts/inter.woff2");
        router.handle(&request, true).await;
        network.down.store(true, Ordering::SeqCst);
        assert_eq!(router.handle(&request, false).await.body, b"font");
        assert_eq!(network.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn api_requests_prefer_network_then_cache() {
        let (router, network, _) = router();
        let request = Request::asset("/api/v1/word/ahlak");
        network.serve("/api/v1/word/ahlak", "v1");
        assert_eq!(router.handle(&request, true).await.body, b"v1");
        network.serve("/api/v1/word/ahlak", "v2");
        assert_eq!(router.handle(&request, true).await.body, b"v2");

        network.down.store(true, Ordering::SeqCst);
        assert_eq!(router.handle(&request, false).await.body, b"v2");
    }

    #[tokio::test]
    async fn stale_images_are_served_then_refreshed() {
        let (router, network, cache) = router();
        let request = Request::asset("/images/logo.svg");
        network.serve("/images/logo.svg", "old");
        assert_eq!(router.handle(&request, true).await.body, b"old");

        network.serve("/images/logo.svg", "new");
        assert_eq!(router.handle(&request, true).await.body, b"old");
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        assert_eq!(
            cache.get("images", "/images/logo.svg").map(|hit| hit.body),
            Some(b"new".to_vec())
        );
    }
}
