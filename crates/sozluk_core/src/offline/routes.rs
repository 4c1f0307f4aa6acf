//! Request classification and the per-request routing decision.

use serde::Serialize;

/// Generic fallback page for navigations with nothing cached.
pub const OFFLINE_FALLBACK_PATH: &str = "/~offline";
/// Landing page of the English search, precached as the search shell.
pub const ENGLISH_SEARCH_PATH: &str = "/en/search";
/// Precache bucket name.
pub const PRECACHE: &str = "precache";

const TURKISH_SEARCH_SEGMENT: &str = "arama";
const ENGLISH_SEARCH_SEGMENT: &str = "search";
const OFFLINE_DICTIONARY_PAGES: [&str; 2] = ["/tr/cevrimdisi-sozluk", "/en/offline-dictionary"];
const LOCALE_ROOTS: [&str; 3] = ["/", "/tr", "/en"];

const STATIC_BUNDLE_PREFIX: &str = "/_next/static/";
const STATIC_BUNDLE_EXTENSIONS: [&str; 3] = ["js", "mjs", "css"];
const FONT_EXTENSIONS: [&str; 5] = ["woff", "woff2", "ttf", "otf", "eot"];
const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "avif"];

/// An intercepted request: its path and whether it is a document navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub path: String,
    pub navigation: bool,
}

impl Request {
    pub fn navigation(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            navigation: true,
        }
    }

    pub fn asset(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            navigation: false,
        }
    }
}

/// Asset families with their own runtime caching rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    StaticBundle,
    Font,
    Image,
    Api,
    Other,
}

impl AssetKind {
    /// Runtime cache bucket used for this kind.
    pub fn cache_name(self) -> &'static str {
        match self {
            AssetKind::StaticBundle => "static-assets",
            AssetKind::Font => "fonts",
            AssetKind::Image => "images",
            AssetKind::Api => "api",
            AssetKind::Other => "others",
        }
    }

    /// Caching strategy for this kind.
    pub fn strategy(self) -> Strategy {
        match self {
            AssetKind::StaticBundle | AssetKind::Font => Strategy::CacheFirst,
            AssetKind::Api => Strategy::NetworkFirst,
            AssetKind::Image | AssetKind::Other => Strategy::StaleWhileRevalidate,
        }
    }
}

/// Runtime caching strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

/// What a request path is, independent of connectivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteClass {
    TurkishSearch { word: Option<String> },
    EnglishSearch { word: Option<String> },
    OfflineDictionary,
    LocaleRoot,
    Page,
    Asset { asset: AssetKind },
}

/// How a request must be served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RouteDecision {
    /// Answer with `302 Found` pointing at `location`.
    Redirect { location: String },
    /// Go to the network; a failure becomes an empty 503.
    NetworkOnly,
    /// Go to the network, then try each precached path in order.
    NetworkThenPrecache { fallbacks: Vec<String> },
    /// Serve the precached copy of `key`, going to the network only on a miss.
    PrecacheFirst { key: String },
    /// Apply a runtime caching strategy in the named bucket.
    Runtime { strategy: Strategy, cache: String },
}

/// Drop the query string, fragment and a trailing slash.
fn clean_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}

fn extension(path: &str) -> Option<String> {
    let file = path.rsplit('/').next()?;
    let (_, ext) = file.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

fn classify_asset(path: &str) -> AssetKind {
    if path.starts_with("/api/") {
        return AssetKind::Api;
    }
    if path.starts_with(STATIC_BUNDLE_PREFIX) {
        return AssetKind::StaticBundle;
    }
    match extension(path) {
        Some(ext) if FONT_EXTENSIONS.contains(&ext.as_str()) => AssetKind::Font,
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => AssetKind::Image,
        Some(ext) if STATIC_BUNDLE_EXTENSIONS.contains(&ext.as_str()) => AssetKind::StaticBundle,
        _ => AssetKind::Other,
    }
}

/// `/{locale}/{segment}` with at most one extra word segment.
fn search_word(path: &str, locale: &str, segment: &str) -> Option<Option<String>> {
    let mut parts = path.trim_start_matches('/').split('/');
    if parts.next() != Some(locale) || parts.next() != Some(segment) {
        return None;
    }
    match (parts.next(), parts.next()) {
        (None, _) => Some(None),
        (Some(word), None) if !word.is_empty() => Some(Some(word.to_string())),
        _ => None,
    }
}

/// Classify a request path.
pub fn classify(request: &Request) -> RouteClass {
    let path = clean_path(&request.path);
    if !request.navigation {
        return RouteClass::Asset {
            asset: classify_asset(path),
        };
    }
    if let Some(word) = search_word(path, "tr", TURKISH_SEARCH_SEGMENT) {
        return RouteClass::TurkishSearch { word };
    }
    if let Some(word) = search_word(path, "en", ENGLISH_SEARCH_SEGMENT) {
        return RouteClass::EnglishSearch { word };
    }
    if OFFLINE_DICTIONARY_PAGES.contains(&path) {
        return RouteClass::OfflineDictionary;
    }
    if LOCALE_ROOTS.contains(&path) {
        return RouteClass::LocaleRoot;
    }
    RouteClass::Page
}

/// English search path equivalent to a Turkish search for `word`.
pub fn english_search_location(word: Option<&str>) -> String {
    match word {
        Some(word) => format!("{}/{}", ENGLISH_SEARCH_PATH, word),
        None => ENGLISH_SEARCH_PATH.to_string(),
    }
}

/// Decide how to serve `request` given current connectivity.
///
/// Only Turkish search navigations depend on `online`; every other route
/// already degrades through its fallback chain.
pub fn decide(request: &Request, online: bool) -> RouteDecision {
    match classify(request) {
        RouteClass::TurkishSearch { word } if !online => RouteDecision::Redirect {
            location: english_search_location(word.as_deref()),
        },
        RouteClass::TurkishSearch { .. } => RouteDecision::NetworkOnly,
        RouteClass::EnglishSearch { word: Some(_) } => RouteDecision::NetworkThenPrecache {
            fallbacks: vec![
                ENGLISH_SEARCH_PATH.to_string(),
                OFFLINE_FALLBACK_PATH.to_string(),
            ],
        },
        RouteClass::OfflineDictionary | RouteClass::LocaleRoot => RouteDecision::PrecacheFirst {
            key: clean_path(&request.path).to_string(),
        },
        RouteClass::EnglishSearch { word: None } | RouteClass::Page => {
            RouteDecision::NetworkThenPrecache {
                fallbacks: vec![
                    clean_path(&request.path).to_string(),
                    OFFLINE_FALLBACK_PATH.to_string(),
                ],
            }
        }
        RouteClass::Asset { asset } => RouteDecision::Runtime {
            strategy: asset.strategy(),
            cache: asset.cache_name().to_string(),
        },
    }
}
