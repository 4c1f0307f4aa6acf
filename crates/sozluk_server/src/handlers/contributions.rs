//! Contribution approvals reported by the moderation workflow.

use super::auth::AdminKey;
use crate::{error::HttpError, AppState};
use axum::{extract::State, Json};
use sozluk_core::models::badge::{AwardOutcome, ContributionEvent};

/// Record an approved contribution and award points and badges.
///
/// Posting the same event id twice is answered with `replayed: true` and
/// no changes.
pub async fn record_contribution(
    State(state): State<AppState>,
    _admin: AdminKey,
    Json(event): Json<ContributionEvent>,
) -> Result<Json<AwardOutcome>, HttpError> {
    let outcome = state.db.gamification.record_contribution(&event)?;
    Ok(Json(outcome))
}
