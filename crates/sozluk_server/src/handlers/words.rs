//! Public dictionary endpoints.

use super::auth::ApiKey;
use crate::{error::HttpError, AppError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use sozluk_core::models::word::WordRecord;
use sozluk_core::search::{autocomplete, AutocompleteOptions};

/// Query string for `/api/v1/autocomplete`.
#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

/// Look up one word by name.
///
/// The exact name wins; otherwise the Turkish-folded key is tried.
///
/// # Errors
/// `401` without a valid key, `404` when the word is not in the local store.
pub async fn get_word(
    State(state): State<AppState>,
    _key: ApiKey,
    Path(word): Path<String>,
) -> Result<Json<WordRecord>, HttpError> {
    let word = word.trim();
    if word.is_empty() {
        return Err(AppError::BadRequest("Word must not be empty".to_string()).into());
    }
    match state.db.dictionary.get(word)? {
        Some(record) => Ok(Json(record)),
        None => Err(AppError::NotFound.into()),
    }
}

/// Suggest word names for a partial query.
pub async fn suggest(
    State(state): State<AppState>,
    _key: ApiKey,
    Query(query): Query<AutocompleteQuery>,
) -> Result<Json<Vec<String>>, HttpError> {
    let options = AutocompleteOptions {
        limit: query.limit.unwrap_or(state.config.autocomplete_limit),
        ..AutocompleteOptions::default()
    };
    Ok(Json(autocomplete(&state.db, &query.q, options)?))
}

/// Answer CORS preflight for the public API from any origin.
pub async fn preflight() -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type, x-api-key"),
    );
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    response
}
