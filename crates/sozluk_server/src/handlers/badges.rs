//! Badge administration endpoints.

use super::auth::AdminKey;
use crate::{error::HttpError, AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sozluk_core::models::badge::{Badge, UpdateBadgeRequest, UserBadge};

/// List every badge definition.
pub async fn list_badges(
    State(state): State<AppState>,
    _admin: AdminKey,
) -> Result<Json<Vec<Badge>>, HttpError> {
    Ok(Json(state.db.gamification.list_badges()?))
}

/// Create a badge.
///
/// # Errors
/// `409` when the slug is taken, `400` when it is malformed.
pub async fn create_badge(
    State(state): State<AppState>,
    _admin: AdminKey,
    Json(badge): Json<Badge>,
) -> Result<(StatusCode, Json<Badge>), HttpError> {
    state.db.gamification.create_badge(&badge)?;
    tracing::info!("Created badge {}", badge.slug);
    Ok((StatusCode::CREATED, Json(badge)))
}

/// Update a badge in place; the slug cannot change.
pub async fn update_badge(
    State(state): State<AppState>,
    _admin: AdminKey,
    Path(slug): Path<String>,
    Json(req): Json<UpdateBadgeRequest>,
) -> Result<Json<Badge>, HttpError> {
    state
        .db
        .gamification
        .update_badge(&slug, req)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound.into())
}

/// Delete a badge together with every award of it.
pub async fn delete_badge(
    State(state): State<AppState>,
    _admin: AdminKey,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, HttpError> {
    if state.db.gamification.delete_badge(&slug)? {
        Ok(Json(serde_json::json!({ "success": true })))
    } else {
        Err(AppError::NotFound.into())
    }
}

/// Manually award a badge, bypassing its threshold.
///
/// # Errors
/// `404` for an unknown badge, `409` when the user already holds it.
pub async fn assign_badge(
    State(state): State<AppState>,
    _admin: AdminKey,
    Path((slug, user_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<UserBadge>), HttpError> {
    let award = state.db.gamification.assign_badge(&user_id, &slug)?;
    tracing::info!("Assigned badge {} to {}", slug, user_id);
    Ok((StatusCode::CREATED, Json(award)))
}

/// Take a badge away from a user.
pub async fn revoke_badge(
    State(state): State<AppState>,
    _admin: AdminKey,
    Path((slug, user_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, HttpError> {
    if state.db.gamification.revoke_badge(&user_id, &slug)? {
        tracing::info!("Revoked badge {} from {}", slug, user_id);
        Ok(Json(serde_json::json!({ "success": true })))
    } else {
        Err(AppError::NotFound.into())
    }
}
