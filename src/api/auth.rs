use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{
    api::{ApiError, RelayState},
    utils,
};

/// Ingress check: the caller must present the pre-shared relay key as a
/// bearer token. This is unrelated to the Spotify token, which pass-through
/// routes read from their own header.
pub async fn require_relay_key(
    State(state): State<Arc<RelayState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    match presented {
        Some(key) if utils::secrets_match(&state.relay_key, key) => Ok(next.run(request).await),
        _ => Err(ApiError::unauthorized(
            "Missing or invalid Authorization header",
        )),
    }
}
