use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// The four persisted authorization fields.
///
/// Serialized with the same key names the values have always been stored
/// under, so a store file can be inspected or seeded by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationState {
    #[serde(rename = "spotify_access_token", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "spotify_refresh_token", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Epoch milliseconds after which the access token is no longer trusted.
    #[serde(
        rename = "spotify_token_expiry",
        default,
        skip_serializing_if = "Option::is_none",
        with = "epoch_millis_string"
    )]
    pub expiry_timestamp: Option<i64>,
    #[serde(rename = "spotify_auth_state", default, skip_serializing_if = "Option::is_none")]
    pub csrf_state: Option<String>,
}

impl AuthorizationState {
    /// Access token that is still usable at `now_ms`.
    ///
    /// A token without an expiry never counts as valid.
    pub fn valid_access_token(&self, now_ms: i64) -> Option<&str> {
        match (&self.access_token, self.expiry_timestamp) {
            (Some(token), Some(expiry)) if expiry > now_ms => Some(token.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// The expiry is a scalar string field like the other three.
mod epoch_millis_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ms) => serializer.serialize_str(&ms.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| s.parse::<i64>().map_err(D::Error::custom))
            .transpose()
    }
}

/// Token endpoint response as forwarded by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub loading: bool,
}

impl AuthStatus {
    pub const LOADING: AuthStatus = AuthStatus {
        authenticated: false,
        loading: true,
    };
    pub const AUTHENTICATED: AuthStatus = AuthStatus {
        authenticated: true,
        loading: false,
    };
    pub const UNAUTHENTICATED: AuthStatus = AuthStatus {
        authenticated: false,
        loading: false,
    };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    pub album: Option<Album>,
}

impl Track {
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopTracks {
    pub items: Vec<Track>,
    pub total: Option<u64>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Followers {
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub followers: Option<Followers>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowedArtists {
    pub artists: ArtistsContainer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistsContainer {
    pub items: Vec<Artist>,
    pub next: Option<String>,
    pub cursors: Option<Cursors>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cursors {
    pub after: Option<String>,
}

/// Now-playing snapshot. Spotify answers 204 when nothing is playing, which
/// is represented as `is_playing == false` with no item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentlyPlaying {
    pub is_playing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Track>,
}

impl CurrentlyPlaying {
    pub fn idle() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRequest {
    pub uris: Vec<String>,
}

/// Body of the relay's `/play` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayPlayRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackAck {
    pub success: bool,
}

/// Top tracks, now playing and followed artists, fetched together.
#[derive(Debug, Clone)]
pub struct Overview {
    pub top_tracks: TopTracks,
    pub currently_playing: CurrentlyPlaying,
    pub followed_artists: FollowedArtists,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub rank: usize,
    pub name: String,
    pub artists: String,
    pub album: String,
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    pub name: String,
    pub followers: String,
    pub genres: String,
}
