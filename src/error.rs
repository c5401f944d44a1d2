use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between the local client, the token relay and
/// the Spotify Web API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Not authenticated with Spotify. Run spotview login")]
    AuthenticationMissing,
    #[error("Authorization code exchange failed: {0}")]
    TokenExchangeFailed(String),
    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),
    #[error("The callback state does not match the state sent with the login request")]
    StateMismatch,
    #[error("Spotify API error {status}: {message}")]
    UpstreamApiError { status: u16, message: String },

    #[error("Missing or invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    NetworkError(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// `true` for a 401 coming back from Spotify or the relay, which usually
    /// means the access token expired mid-session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::UpstreamApiError { status: 401, .. })
    }
}
