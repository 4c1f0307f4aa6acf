//! Server-side dictionary sync controls.

use super::auth::AdminKey;
use crate::{error::HttpError, AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use sozluk_core::SyncStatus;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// Fetch the remote manifest instead of reporting the last known state.
    #[serde(default)]
    pub refresh: bool,
}

/// Report the sync status.
pub async fn sync_status(
    State(state): State<AppState>,
    _admin: AdminKey,
    Query(query): Query<StatusQuery>,
) -> Result<Json<SyncStatus>, HttpError> {
    if query.refresh {
        Ok(Json(state.sync.check_status().await?))
    } else {
        Ok(Json(state.sync.status()))
    }
}

/// Download or update the dictionary to the remote version.
///
/// # Errors
/// `423` while another sync runs, `502` when the object store fails.
pub async fn trigger_sync(
    State(state): State<AppState>,
    _admin: AdminKey,
) -> Result<Json<SyncStatus>, HttpError> {
    Ok(Json(state.sync.update().await?))
}

/// Drop the local dictionary.
pub async fn delete_dictionary(
    State(state): State<AppState>,
    _admin: AdminKey,
) -> Result<Json<SyncStatus>, HttpError> {
    Ok(Json(state.sync.delete().await?))
}
