//! Header-based key checks for public and administrative routes.

use crate::{error::HttpError, AppError, AppState};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sozluk_core::constants::{ADMIN_KEY_HEADER, API_KEY_HEADER};

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Proof that the request carried a configured `x-api-key`.
pub struct ApiKey;

#[async_trait]
impl FromRequestParts<AppState> for ApiKey {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match header_value(parts, API_KEY_HEADER) {
            Some(key) if state.config.api_keys.iter().any(|known| known == key) => Ok(ApiKey),
            _ => Err(AppError::Unauthorized.into()),
        }
    }
}

/// Proof that the request carried the administrator key.
///
/// Without a configured `ADMIN_API_KEY` every admin request is rejected.
pub struct AdminKey;

#[async_trait]
impl FromRequestParts<AppState> for AdminKey {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match (header_value(parts, ADMIN_KEY_HEADER), state.config.admin_api_key.as_deref()) {
            (Some(given), Some(expected)) if given == expected => Ok(AdminKey),
            _ => Err(AppError::Unauthorized.into()),
        }
    }
}
