//! # Spotify Integration Module
//!
//! HTTP clients for everything spotview talks to:
//!
//! ```text
//! AuthManager ──► RelayClient ──► relay (/callback, /refresh, pass-through)
//!                                   │
//!                                   ├──► token::TokenEndpoint ──► accounts.spotify.com/api/token
//!                                   └──► SpotifyClient ─────────► api.spotify.com/v1
//! CLI ─────────► SpotifyClient ─────────────────────────────────► api.spotify.com/v1
//! ```
//!
//! - [`client`] - bearer-authenticated resource API client, one per access token
//! - [`relay`] - client for the token relay's HTTP contract
//! - [`token`] - token endpoint calls made by the relay with the client secret
//!
//! Non-2xx answers from any of them are turned into
//! [`Error::UpstreamApiError`] by [`upstream_error`], carrying the HTTP status
//! and the most specific message the body offers.

pub mod client;
pub mod relay;
pub mod token;

use reqwest::Response;
use serde_json::Value;

use crate::error::Error;

/// Header carrying the Spotify access token on relay pass-through calls.
pub const RELAY_SPOTIFY_TOKEN_HEADER: &str = "x-spotify-token";

pub const TOP_TRACKS_PATH: &str = "/me/top/tracks?limit=10&time_range=medium_term";
pub const CURRENTLY_PLAYING_PATH: &str = "/me/player/currently-playing";
pub const FOLLOWED_ARTISTS_PATH: &str = "/me/following?type=artist&limit=20";
pub const PLAY_PATH: &str = "/me/player/play";
pub const PAUSE_PATH: &str = "/me/player/pause";

/// Converts a failed response into [`Error::UpstreamApiError`].
pub async fn upstream_error(res: Response) -> Error {
    let status = res.status().as_u16();
    let body = res.json::<Value>().await.unwrap_or(Value::Null);

    Error::UpstreamApiError {
        status,
        message: error_message(&body).unwrap_or_else(|| format!("Spotify API error: {status}")),
    }
}

/// Picks the message out of the error shapes seen in the wild:
/// `{"error": {"message": ..}}` from the Web API, `{"error_description": ..}`
/// from the accounts service and `{"error": ".."}` from the relay.
pub fn error_message(body: &Value) -> Option<String> {
    if let Some(message) = body["error"]["message"].as_str() {
        return Some(message.to_string());
    }
    if let Some(description) = body["error_description"].as_str() {
        return Some(description.to_string());
    }
    body["error"].as_str().map(str::to_string)
}
