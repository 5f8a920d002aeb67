//! Authentication for the agent control API

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};
use std::sync::Arc;
use tracing::warn;

use crate::AppState;

/// Bearer-token guard for the control routes. Taking it as a handler argument
/// rejects the request with 401 before the handler body runs.
pub struct ApiKeyAuth;

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

impl FromRequestParts<Arc<AppState>> for ApiKeyAuth {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if bearer_token(parts).is_some_and(|token| token == state.api_key) {
            return Ok(ApiKeyAuth);
        }

        warn!(
            path = parts.uri.path(),
            "Rejected control request: bad or missing API key"
        );
        Err(StatusCode::UNAUTHORIZED)
    }
}
