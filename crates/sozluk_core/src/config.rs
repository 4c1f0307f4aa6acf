//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_AUTOCOMPLETE_LIMIT, DEFAULT_CACHE_TTL_SECS, DEFAULT_DATA_FOLDER, DEFAULT_PORT,
    MAX_AUTOCOMPLETE_LIMIT,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Default object-store base URL used when `DATA_BASE_URL` is unset.
pub const DEFAULT_DATA_BASE_URL: &str = "http://127.0.0.1:9000/sozluk";

/// Runtime configuration for Sözlük.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub data_base_url: String,
    pub data_folder: String,
    pub api_keys: Vec<String>,
    pub admin_api_key: Option<String>,
    pub autocomplete_limit: usize,
    pub cache_ttl_secs: u64,
    pub allow_public_access: bool,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Split a comma-separated key list, dropping blanks.
pub fn parse_key_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_db_path() -> String {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache")
        .join("sozluk")
        .join("db")
        .to_string_lossy()
        .to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Arguments
    /// - `lookup`: Returns the raw value for a variable name, if set.
    ///
    /// # Returns
    /// A populated [`Config`]; unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            db_path: non_empty("DB_PATH")
                .map(expand_tilde)
                .unwrap_or_else(default_db_path),
            port: non_empty("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            data_base_url: non_empty("DATA_BASE_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_DATA_BASE_URL.to_string()),
            data_folder: non_empty("DATA_FOLDER")
                .map(|folder| folder.trim().trim_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_DATA_FOLDER.to_string()),
            api_keys: lookup("API_KEYS")
                .map(|keys| parse_key_list(&keys))
                .unwrap_or_default(),
            admin_api_key: non_empty("ADMIN_API_KEY").map(|key| key.trim().to_string()),
            autocomplete_limit: non_empty("AUTOCOMPLETE_LIMIT")
                .and_then(|l| l.trim().parse::<usize>().ok())
                .map(|l| l.clamp(1, MAX_AUTOCOMPLETE_LIMIT))
                .unwrap_or(DEFAULT_AUTOCOMPLETE_LIMIT),
            cache_ttl_secs: non_empty("CACHE_TTL_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_CACHE_TTL_SECS),
            // Default to false - cross-origin admin access should be explicit
            allow_public_access: lookup("ALLOW_PUBLIC_ACCESS")
                .and_then(|value| parse_env_flag(&value))
                .unwrap_or(false),
        }
    }
}
