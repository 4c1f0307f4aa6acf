//! Remote data sources for the ingest pipeline.

use crate::constants::METADATA_FILE_NAME;
use crate::error::AppError;
use crate::models::{
    manifest::Metadata,
    word::{parse_word_file, WordRecord},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Where manifests and data files come from.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch and decode `metadata.json`.
    async fn fetch_metadata(&self) -> Result<Metadata, AppError>;

    /// Fetch and decode one data file listed in the manifest.
    async fn fetch_file(&self, file_name: &str) -> Result<Vec<WordRecord>, AppError>;
}

/// Object-store source reached over HTTP.
///
/// Files live at `{base_url}/{folder}/{name}`.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    folder: String,
}

impl HttpSource {
    /// Build a source with a 60s request timeout.
    ///
    /// # Errors
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(base_url: &str, folder: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self::with_client(client, base_url, folder))
    }

    /// Build a source around an existing client.
    pub fn with_client(client: reqwest::Client, base_url: &str, folder: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            folder: folder.trim_matches('/').to_string(),
        }
    }

    /// Source configured from `DATA_BASE_URL` / `DATA_FOLDER`.
    ///
    /// # Errors
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn from_config(config: &crate::Config) -> Result<Self, AppError> {
        Self::new(&config.data_base_url, &config.data_folder)
    }

    fn url_for(&self, file_name: &str) -> String {
        if self.folder.is_empty() {
            format!("{}/{}", self.base_url, file_name)
        } else {
            format!("{}/{}/{}", self.base_url, self.folder, file_name)
        }
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("GET {} returned {}", url, status)));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch_metadata(&self) -> Result<Metadata, AppError> {
        let url = self.url_for(METADATA_FILE_NAME);
        let body = self.get_bytes(&url).await?;
        serde_json::from_slice(&body)
            .map_err(|err| AppError::Fetch(format!("Invalid manifest at {}: {}", url, err)))
    }

    async fn fetch_file(&self, file_name: &str) -> Result<Vec<WordRecord>, AppError> {
        let url = self.url_for(file_name);
        let body = self.get_bytes(&url).await?;
        parse_word_file(&body)
            .map_err(|err| AppError::Fetch(format!("Invalid data file at {}: {}", url, err)))
    }
}

#[derive(Default)]
struct MemoryState {
    metadata: Option<Metadata>,
    files: HashMap<String, Vec<WordRecord>>,
}

/// In-process source holding a published manifest and its files.
///
/// Used to ingest bundled data and to drive the pipeline in tests.
#[derive(Default)]
pub struct MemorySource {
    state: Mutex<MemoryState>,
    metadata_fetches: AtomicUsize,
    file_fetches: AtomicUsize,
}

impl MemorySource {
    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::StorageMessage("Memory source state poisoned".to_string()))
    }

    /// Replace the published data set with `files` under `version`.
    ///
    /// The manifest lists files in the given order.
    pub fn publish(&self, version: u64, files: Vec<(String, Vec<WordRecord>)>) {
        let metadata = Metadata {
            version,
            files: files.iter().map(|(name, _)| name.clone()).collect(),
        };
        if let Ok(mut state) = self.state.lock() {
            state.metadata = Some(metadata);
            state.files = files.into_iter().collect();
        }
    }

    /// Remove a single file while keeping it listed, to simulate a broken upload.
    pub fn remove_file(&self, file_name: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.files.remove(file_name);
        }
    }

    /// Number of manifest fetches served so far.
    pub fn metadata_fetches(&self) -> usize {
        self.metadata_fetches.load(Ordering::SeqCst)
    }

    /// Number of data-file fetches served so far.
    pub fn file_fetches(&self) -> usize {
        self.file_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn fetch_metadata(&self) -> Result<Metadata, AppError> {
        self.metadata_fetches.fetch_add(1, Ordering::SeqCst);
        self.state()?
            .metadata
            .clone()
            .ok_or_else(|| AppError::Fetch("No manifest published".to_string()))
    }

    async fn fetch_file(&self, file_name: &str) -> Result<Vec<WordRecord>, AppError> {
        self.file_fetches.fetch_add(1, Ordering::SeqCst);
        self.state()?
            .files
            .get(file_name)
            .cloned()
            .ok_or_else(|| AppError::Fetch(format!("File '{}' not found", file_name)))
    }
}
