use reqwest::{Client, RequestBuilder, Response};

use crate::{
    config::ClientConfig,
    error::{Error, Result},
    spotify::{RELAY_SPOTIFY_TOKEN_HEADER, upstream_error},
    types::{
        CurrentlyPlaying, FollowedArtists, PlaybackAck, RelayPlayRequest, TokenResponse, TopTracks,
    },
};

/// Client side of the token relay.
///
/// Every request carries the pre-shared relay key as its bearer credential.
/// That key only opens the relay's door; the Spotify token for pass-through
/// calls travels separately in the `X-Spotify-Token` header.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: Client,
    base_url: String,
    relay_key: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>, relay_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            relay_key: relay_key.into(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.relay_url, &config.relay_key)
    }

    /// Trades an authorization code for tokens.
    ///
    /// Any failure, including transport errors, becomes
    /// [`Error::TokenExchangeFailed`].
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let request = self.get("/callback").query(&[("code", code)]);
        self.token_call(request)
            .await
            .map_err(|e| Error::TokenExchangeFailed(failure_reason(e)))
    }

    /// Trades a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let request = self
            .get("/refresh")
            .query(&[("refresh_token", refresh_token)]);
        self.token_call(request)
            .await
            .map_err(|e| Error::TokenRefreshFailed(failure_reason(e)))
    }

    /// `GET /top-tracks` through the relay.
    ///
    /// # Arguments
    ///
    /// * `access_token` - Spotify access token, sent as `X-Spotify-Token`
    ///
    /// # Errors
    ///
    /// [`Error::UpstreamApiError`] with the relay's status and message for any
    /// non-2xx answer. A 401 means the relay key was rejected or Spotify
    /// refused the access token.
    pub async fn top_tracks(&self, access_token: &str) -> Result<TopTracks> {
        let res = self.send(self.get("/top-tracks"), access_token).await?;
        Ok(res.json().await?)
    }

    /// `GET /currently-playing`. An idle player decodes as
    /// `is_playing == false`.
    pub async fn currently_playing(&self, access_token: &str) -> Result<CurrentlyPlaying> {
        let res = self
            .send(self.get("/currently-playing"), access_token)
            .await?;
        Ok(res.json().await?)
    }

    /// `GET /followed-artists`.
    pub async fn followed_artists(&self, access_token: &str) -> Result<FollowedArtists> {
        let res = self
            .send(self.get("/followed-artists"), access_token)
            .await?;
        Ok(res.json().await?)
    }

    /// `POST /play`, with `{"uri": ..}` when a track is given and `{}`
    /// otherwise.
    pub async fn play(&self, access_token: &str, uri: Option<&str>) -> Result<PlaybackAck> {
        let body = RelayPlayRequest {
            uri: uri.map(str::to_string),
        };
        let res = self
            .send(self.post("/play").json(&body), access_token)
            .await?;
        Ok(res.json().await?)
    }

    /// `POST /pause`.
    pub async fn pause(&self, access_token: &str) -> Result<PlaybackAck> {
        let res = self.send(self.post("/pause"), access_token).await?;
        Ok(res.json().await?)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.relay_key)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.relay_key)
    }

    async fn token_call(&self, request: RequestBuilder) -> Result<TokenResponse> {
        let res = request.send().await?;
        let res = check(res).await?;
        Ok(res.json().await?)
    }

    async fn send(&self, request: RequestBuilder, access_token: &str) -> Result<Response> {
        let res = request
            .header(RELAY_SPOTIFY_TOKEN_HEADER, access_token)
            .send()
            .await?;
        check(res).await
    }
}

async fn check(res: Response) -> Result<Response> {
    if res.status().is_success() {
        Ok(res)
    } else {
        Err(upstream_error(res).await)
    }
}

fn failure_reason(err: Error) -> String {
    match err {
        Error::UpstreamApiError { status, message } => format!("{message} ({status})"),
        other => other.to_string(),
    }
}
