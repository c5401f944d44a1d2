use reqwest::{
    Client, Method, RequestBuilder, StatusCode,
    header::{AUTHORIZATION, HeaderValue},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{
    error::{Error, Result},
    spotify::{
        CURRENTLY_PLAYING_PATH, FOLLOWED_ARTISTS_PATH, PAUSE_PATH, PLAY_PATH, TOP_TRACKS_PATH,
        upstream_error,
    },
    types::{CurrentlyPlaying, FollowedArtists, Overview, PlayRequest, PlaybackAck, TopTracks},
};

/// Spotify Web API client bound to one access token.
///
/// The token is attached to every request as a bearer header. The underlying
/// `reqwest::Client` can be shared between many `SpotifyClient`s, which is
/// what the relay does: one connection pool, one client per incoming token.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    base_url: String,
    bearer: HeaderValue,
}

impl SpotifyClient {
    /// Builds a client for `access_token` with its own connection pool.
    ///
    /// # Errors
    ///
    /// [`Error::AuthenticationMissing`] when there is no token; nothing is sent
    /// over the network in that case.
    pub fn new(access_token: Option<&str>, base_url: impl Into<String>) -> Result<Self> {
        Self::with_http(Client::new(), access_token, base_url)
    }

    /// Builds a client for `access_token` on top of an existing `http` client.
    ///
    /// # Arguments
    ///
    /// * `http` - Connection pool to send requests through
    /// * `access_token` - Spotify access token; `None` or empty is rejected
    /// * `base_url` - Web API root, normally [`SPOTIFY_API_URL`](crate::config::SPOTIFY_API_URL)
    ///
    /// # Errors
    ///
    /// [`Error::AuthenticationMissing`] when the token is missing or cannot be
    /// used as a header value.
    pub fn with_http(
        http: Client,
        access_token: Option<&str>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let token = access_token
            .filter(|t| !t.is_empty())
            .ok_or(Error::AuthenticationMissing)?;

        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::AuthenticationMissing)?;
        bearer.set_sensitive(true);

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer,
        })
    }

    /// The user's ten most played tracks over the medium term.
    ///
    /// # Errors
    ///
    /// [`Error::UpstreamApiError`] for a non-2xx answer, transport and decode
    /// errors otherwise.
    pub async fn top_tracks(&self) -> Result<TopTracks> {
        self.get(TOP_TRACKS_PATH).await
    }

    /// What is playing right now. An idle player is not an error.
    pub async fn currently_playing(&self) -> Result<CurrentlyPlaying> {
        Ok(serde_json::from_value(
            self.get_json(CURRENTLY_PLAYING_PATH).await?,
        )?)
    }

    /// First page (20) of the artists the user follows.
    pub async fn followed_artists(&self) -> Result<FollowedArtists> {
        self.get(FOLLOWED_ARTISTS_PATH).await
    }

    /// Resumes playback, or starts `uri` when one is given.
    pub async fn play(&self, uri: Option<&str>) -> Result<PlaybackAck> {
        let mut request = self.request(Method::PUT, PLAY_PATH);
        if let Some(uri) = uri {
            request = request.json(&PlayRequest {
                uris: vec![uri.to_string()],
            });
        }
        self.control(request).await
    }

    /// Pauses playback on the active device. Sends no body.
    pub async fn pause(&self) -> Result<PlaybackAck> {
        self.control(self.request(Method::PUT, PAUSE_PATH)).await
    }

    /// Top tracks, now playing and followed artists, requested concurrently.
    /// Fails as a whole if any of the three fails.
    pub async fn overview(&self) -> Result<Overview> {
        let (top_tracks, currently_playing, followed_artists) = tokio::try_join!(
            self.top_tracks(),
            self.currently_playing(),
            self.followed_artists()
        )?;

        Ok(Overview {
            top_tracks,
            currently_playing,
            followed_artists,
        })
    }

    /// Raw GET returning the JSON body. 204 and empty bodies come back as
    /// `{"is_playing": false}`, which is what the player endpoints mean by them.
    pub async fn get_json(&self, path: &str) -> Result<Value> {
        let res = self.request(Method::GET, path).send().await?;
        if !res.status().is_success() {
            return Err(upstream_error(res).await);
        }
        if res.status() == StatusCode::NO_CONTENT {
            return Ok(json!({ "is_playing": false }));
        }

        let bytes = res.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(json!({ "is_playing": false }));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Same three calls as [`overview`](Self::overview), as provider JSON.
    ///
    /// The document has `topTracks` (the top tracks items), `currentlyPlaying`
    /// (the player body, or `{"is_playing": false}` when no track is loaded)
    /// and `followedArtists` (the followed artists items). Fields spotview
    /// does not model are kept.
    pub async fn raw_overview(&self) -> Result<Value> {
        let (top_tracks, currently_playing, followed_artists) = tokio::try_join!(
            self.get_json(TOP_TRACKS_PATH),
            self.get_json(CURRENTLY_PLAYING_PATH),
            self.get_json(FOLLOWED_ARTISTS_PATH)
        )?;

        let currently_playing = if currently_playing["item"].is_object() {
            currently_playing
        } else {
            json!({ "is_playing": false })
        };

        Ok(json!({
            "topTracks": items(top_tracks.get("items")),
            "currentlyPlaying": currently_playing,
            "followedArtists": items(followed_artists.pointer("/artists/items"))
        }))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Ok(serde_json::from_value(self.get_json(path).await?)?)
    }

    async fn control(&self, request: RequestBuilder) -> Result<PlaybackAck> {
        let res = request.send().await?;
        if !res.status().is_success() {
            return Err(upstream_error(res).await);
        }
        Ok(PlaybackAck { success: true })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(AUTHORIZATION, self.bearer.clone())
    }
}

fn items(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Array(items)) => Value::Array(items.clone()),
        _ => Value::Array(Vec::new()),
    }
}
