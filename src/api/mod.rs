//! # API Module
//!
//! HTTP endpoints of the token relay. The relay is the only component that
//! knows the Spotify client secret; the local client talks to it instead of the
//! accounts service.
//!
//! ## Endpoints
//!
//! ### Token exchange
//!
//! - [`callback`] - `GET /callback?code=` exchanges an authorization code
//! - [`refresh`] - `GET /refresh?refresh_token=` refreshes an access token
//!
//! ### Pass-through
//!
//! Forwarded to the Spotify Web API with the token from the `X-Spotify-Token`
//! header:
//!
//! - [`top_tracks`] - `GET /top-tracks`
//! - [`currently_playing`] - `GET /currently-playing`
//! - [`followed_artists`] - `GET /followed-artists`
//! - [`play`] - `POST /play`
//! - [`pause`] - `POST /pause`
//!
//! ### Monitoring
//!
//! - [`health`] - `GET /health`, the only route that needs no relay key
//!
//! ## Ingress
//!
//! Everything except `/health` and CORS preflight goes through
//! [`require_relay_key`]. Failures are rendered by [`ApiError`] as
//! `{"error": "..", "status": N}`.

mod auth;
mod callback;
mod error;
mod health;
mod player;

use reqwest::Client;

pub use auth::require_relay_key;
pub use callback::{callback, refresh};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use health::{health, unknown_endpoint};
pub use player::{currently_playing, followed_artists, pause, play, top_tracks};

use crate::{config::RelayConfig, spotify::token::TokenEndpoint};

/// Shared, read-only state of the relay.
///
/// `http` is the single connection pool for all outbound calls, token
/// endpoint and pass-through alike.
pub struct RelayState {
    pub http: Client,
    pub token_endpoint: TokenEndpoint,
    pub api_base_url: String,
    pub relay_key: String,
}

impl RelayState {
    pub fn new(config: &RelayConfig) -> Self {
        let http = Client::new();
        Self {
            token_endpoint: TokenEndpoint::new(http.clone(), config),
            http,
            api_base_url: config.api_base_url.clone(),
            relay_key: config.relay_key.clone(),
        }
    }
}
