//! Versioned bulk download of the offline dictionary.
//!
//! [`SyncManager`] compares the remote manifest against the local version
//! marker and, when asked, ingests every listed file into a fresh storage
//! generation before committing it in one step.

/// Network-first lookups with a local cache fallback.
pub mod cache;
/// Manifest and data-file sources.
pub mod source;

use crate::error::AppError;
use crate::models::manifest::Metadata;
use crate::Database;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, MutexGuard};

pub use source::{DataSource, HttpSource, MemorySource};

/// Observable state of the local dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum SyncStatus {
    /// Nothing checked yet in this process.
    Idle,
    Checking,
    NotDownloaded,
    UpToDate { version: u64 },
    UpdateAvailable { local: u64, remote: u64 },
    Downloading { processed: usize, total: usize },
    Error { message: String },
}

/// Progress report emitted after each data file is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncProgress {
    pub processed: usize,
    pub total: usize,
    pub file: String,
}

impl SyncProgress {
    /// Completed share of the run in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.processed as f64 / self.total as f64
    }
}

/// Classify a local version against the remote manifest version.
pub fn classify(local: Option<u64>, remote: u64) -> SyncStatus {
    match local {
        None => SyncStatus::NotDownloaded,
        Some(local) if local == remote => SyncStatus::UpToDate { version: remote },
        Some(local) => SyncStatus::UpdateAvailable { local, remote },
    }
}

/// Drives status checks, downloads, and deletion of the local dictionary.
///
/// At most one download, update, or delete runs at a time; a concurrent
/// trigger fails with [`AppError::Locked`].
pub struct SyncManager {
    db: Arc<Database>,
    source: Arc<dyn DataSource>,
    status: watch::Sender<SyncStatus>,
    in_flight: Mutex<()>,
}

impl SyncManager {
    /// Create a manager over `db`, pulling data from `source`.
    pub fn new(db: Arc<Database>, source: Arc<dyn DataSource>) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        Self {
            db,
            source,
            status,
            in_flight: Mutex::new(()),
        }
    }

    /// Latest published status.
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    fn set_status(&self, status: SyncStatus) {
        self.status.send_replace(status);
    }

    fn try_begin(&self) -> Result<MutexGuard<'_, ()>, AppError> {
        self.in_flight
            .try_lock()
            .map_err(|_| AppError::Locked("A dictionary sync is already in progress".to_string()))
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, AppError> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || op(&db)).await?
    }

    fn fail(&self, err: AppError) -> AppError {
        tracing::error!("Dictionary sync failed: {}", err);
        self.set_status(SyncStatus::Error {
            message: err.to_string(),
        });
        err
    }

    async fn fetch_metadata(&self) -> Result<Metadata, AppError> {
        let metadata = self.source.fetch_metadata().await?;
        metadata.validate().map_err(AppError::Fetch)?;
        Ok(metadata)
    }

    fn sync_running(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Fetch the remote manifest and classify the local data against it.
    ///
    /// Status checks never take the sync guard, so a download may start while
    /// one is pending. While a download is running the current status is
    /// returned without touching the network, and a check that finishes
    /// during a run does not overwrite the run's published status.
    ///
    /// # Errors
    /// Returns fetch or storage errors; the status becomes `Error` unless a
    /// sync is running.
    pub async fn check_status(&self) -> Result<SyncStatus, AppError> {
        if self.sync_running() {
            return Ok(self.status());
        }
        self.set_status(SyncStatus::Checking);
        let result = async {
            let metadata = self.fetch_metadata().await?;
            let local = self.blocking(|db| db.versions.local_version()).await?;
            Ok::<_, AppError>(classify(local, metadata.version))
        }
        .await;
        if self.sync_running() {
            return result;
        }
        match result {
            Ok(status) => {
                self.set_status(status.clone());
                Ok(status)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Download the dictionary for the first time.
    ///
    /// # Errors
    /// See [`Self::update_with_progress`].
    pub async fn download(&self) -> Result<SyncStatus, AppError> {
        self.update_with_progress(|_| {}).await
    }

    /// Bring the local dictionary to the remote version.
    ///
    /// # Errors
    /// See [`Self::update_with_progress`].
    pub async fn update(&self) -> Result<SyncStatus, AppError> {
        self.update_with_progress(|_| {}).await
    }

    /// Download or update, reporting progress after each file.
    ///
    /// When the local version already equals the remote one nothing is
    /// fetched beyond the manifest. Otherwise files are ingested in manifest
    /// order into a new generation that becomes visible only after the last
    /// file is written. A failure discards the partial generation and leaves
    /// the previous data and version untouched.
    ///
    /// # Returns
    /// The re-evaluated status, normally `UpToDate`.
    ///
    /// # Errors
    /// Returns [`AppError::Locked`] when another run is in progress, or the
    /// fetch/parse/storage error that aborted the run.
    pub async fn update_with_progress<F>(&self, mut on_progress: F) -> Result<SyncStatus, AppError>
    where
        F: FnMut(SyncProgress) + Send,
    {
        let _flight = self.try_begin()?;
        self.set_status(SyncStatus::Checking);
        match self.run_update(&mut on_progress).await {
            Ok(status) => {
                self.set_status(status.clone());
                Ok(status)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    async fn run_update<F>(&self, on_progress: &mut F) -> Result<SyncStatus, AppError>
    where
        F: FnMut(SyncProgress) + Send,
    {
        let metadata = self.fetch_metadata().await?;
        let local = self.blocking(|db| db.versions.local_version()).await?;
        if local == Some(metadata.version) {
            tracing::info!("Dictionary already at version {}", metadata.version);
            return Ok(SyncStatus::UpToDate {
                version: metadata.version,
            });
        }

        tracing::info!(
            "Syncing dictionary {:?} -> {} ({} files)",
            local,
            metadata.version,
            metadata.files.len()
        );
        let generation = self.blocking(|db| db.dictionary.begin_generation()).await?;
        let version = metadata.version;
        let ingested = async {
            self.ingest(generation, &metadata, on_progress).await?;
            self.blocking(move |db| db.dictionary.commit_generation(generation, version))
                .await
        }
        .await;

        if let Err(err) = ingested {
            let discarded = self
                .blocking(move |db| db.dictionary.discard_generation(generation))
                .await;
            if let Err(discard_err) = discarded {
                tracing::warn!(
                    "Failed to discard partial generation {}: {}",
                    generation,
                    discard_err
                );
            }
            return Err(err);
        }

        let local = self.blocking(|db| db.versions.local_version()).await?;
        tracing::info!("Dictionary synced to version {}", version);
        Ok(classify(local, version))
    }

    async fn ingest<F>(
        &self,
        generation: u64,
        metadata: &Metadata,
        on_progress: &mut F,
    ) -> Result<(), AppError>
    where
        F: FnMut(SyncProgress) + Send,
    {
        let total = metadata.files.len();
        self.set_status(SyncStatus::Downloading {
            processed: 0,
            total,
        });
        for (index, file) in metadata.files.iter().enumerate() {
            let records = self.source.fetch_file(file).await?;
            let written = self
                .blocking(move |db| db.dictionary.write_batch(generation, &records))
                .await?;
            let processed = index + 1;
            tracing::debug!(
                "Ingested {} ({} words), {}/{}",
                file,
                written,
                processed,
                total
            );
            self.set_status(SyncStatus::Downloading { processed, total });
            on_progress(SyncProgress {
                processed,
                total,
                file: file.clone(),
            });
        }
        Ok(())
    }

    /// Remove all local dictionary data and the version marker.
    ///
    /// # Errors
    /// Returns [`AppError::Locked`] while a sync is running, or a storage error.
    pub async fn delete(&self) -> Result<SyncStatus, AppError> {
        let _flight = self.try_begin()?;
        match self.blocking(|db| db.dictionary.clear()).await {
            Ok(()) => {
                tracing::info!("Offline dictionary deleted");
                self.set_status(SyncStatus::NotDownloaded);
                Ok(SyncStatus::NotDownloaded)
            }
            Err(err) => Err(self.fail(err)),
        }
    }
}
