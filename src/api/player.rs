use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use serde_json::Value;

use crate::{
    api::{ApiError, ApiResult, RelayState},
    spotify::{
        CURRENTLY_PLAYING_PATH, FOLLOWED_ARTISTS_PATH, RELAY_SPOTIFY_TOKEN_HEADER,
        TOP_TRACKS_PATH, client::SpotifyClient,
    },
    types::{PlaybackAck, RelayPlayRequest},
};

pub async fn top_tracks(
    State(state): State<Arc<RelayState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    proxy_get(&state, &headers, TOP_TRACKS_PATH).await
}

/// Nothing playing (204 upstream) is answered with `{"is_playing": false}`.
pub async fn currently_playing(
    State(state): State<Arc<RelayState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    proxy_get(&state, &headers, CURRENTLY_PLAYING_PATH).await
}

pub async fn followed_artists(
    State(state): State<Arc<RelayState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    proxy_get(&state, &headers, FOLLOWED_ARTISTS_PATH).await
}

/// `POST /play` with an optional `{"uri": ".."}` body.
pub async fn play(
    State(state): State<Arc<RelayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<PlaybackAck>> {
    let request: RelayPlayRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RelayPlayRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))?
    };

    let client = spotify_client(&state, &headers)?;
    let ack = client
        .play(request.uri.as_deref())
        .await
        .map_err(ApiError::from_resource)?;
    Ok(Json(ack))
}

pub async fn pause(
    State(state): State<Arc<RelayState>>,
    headers: HeaderMap,
) -> ApiResult<Json<PlaybackAck>> {
    let client = spotify_client(&state, &headers)?;
    let ack = client.pause().await.map_err(ApiError::from_resource)?;
    Ok(Json(ack))
}

async fn proxy_get(state: &RelayState, headers: &HeaderMap, path: &str) -> ApiResult<Json<Value>> {
    let client = spotify_client(state, headers)?;
    let body = client
        .get_json(path)
        .await
        .map_err(ApiError::from_resource)?;
    Ok(Json(body))
}

fn spotify_client(state: &RelayState, headers: &HeaderMap) -> ApiResult<SpotifyClient> {
    let token = headers
        .get(RELAY_SPOTIFY_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());
    SpotifyClient::with_http(state.http.clone(), token, &state.api_base_url)
        .map_err(ApiError::from_resource)
}
