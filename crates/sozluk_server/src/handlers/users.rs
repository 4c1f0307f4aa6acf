//! Public profile endpoints.

use super::auth::ApiKey;
use crate::{error::HttpError, AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use sozluk_core::models::badge::{UserBadge, UserStats};

pub async fn user_badges(
    State(state): State<AppState>,
    _key: ApiKey,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<UserBadge>>, HttpError> {
    Ok(Json(state.db.gamification.user_badges(&user_id)?))
}

/// Points and per-action counts; users without contributions get zeros.
pub async fn user_stats(
    State(state): State<AppState>,
    _key: ApiKey,
    Path(user_id): Path<String>,
) -> Result<Json<UserStats>, HttpError> {
    Ok(Json(state.db.gamification.user_stats(&user_id)?))
}
