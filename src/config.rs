//! Configuration management for spotview.
//!
//! Both halves of the application read their settings from environment
//! variables. On startup [`load_env`] pulls in a `.env` file from the local data
//! directory, so the client id, relay key and friends do not have to be exported
//! in every shell:
//!
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Spotify defaults for the well-known endpoint URLs
//!
//! The values end up in two explicit structs, [`ClientConfig`] for the local
//! client and [`RelayConfig`] for the token relay, which are handed to the
//! components at construction time.

use std::{env, path::PathBuf};

use crate::{
    error::{Error, Result},
    scope::{DEFAULT_SCOPES, Scope},
};

pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_RELAY_ADDRESS: &str = "127.0.0.1:8787";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives under `spotview/.env` in the platform-specific local data
/// directory:
/// - Linux: `~/.local/share/spotview/.env`
/// - macOS: `~/Library/Application Support/spotview/.env`
/// - Windows: `%LOCALAPPDATA%/spotview/.env`
///
/// A missing file is not an error; every setting can also come from the process
/// environment.
///
/// # Errors
///
/// Fails if the directory cannot be created or the file exists but cannot be
/// parsed.
pub async fn load_env() -> Result<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Config(format!(
            "cannot read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Root of everything spotview keeps on disk.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotview");
    path
}

/// Settings for the local client: login redirect, relay location and the
/// Spotify Web API base URL.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<Scope>,
    pub api_base_url: String,
    pub auth_url: String,
    pub relay_url: String,
    pub relay_key: String,
    /// Address the local listener binds to while waiting for the login redirect.
    pub server_addr: String,
}

impl ClientConfig {
    pub fn new(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        relay_url: impl Into<String>,
        relay_key: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: DEFAULT_SCOPES.to_vec(),
            api_base_url: SPOTIFY_API_URL.to_string(),
            auth_url: SPOTIFY_AUTH_URL.to_string(),
            relay_url: relay_url.into(),
            relay_key: relay_key.into(),
            server_addr: "127.0.0.1:8080".to_string(),
        }
    }

    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = Scope>) -> Self {
        self.scopes = scopes.into_iter().collect();
        self
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            redirect_uri: required("SPOTIFY_API_REDIRECT_URI")?,
            scopes: DEFAULT_SCOPES.to_vec(),
            api_base_url: optional("SPOTIFY_API_URL", SPOTIFY_API_URL),
            auth_url: optional("SPOTIFY_API_AUTH_URL", SPOTIFY_AUTH_URL),
            relay_url: required("SPOTVIEW_RELAY_URL")?,
            relay_key: required("SPOTVIEW_RELAY_KEY")?,
            server_addr: required("SERVER_ADDRESS")?,
        })
    }
}

/// Settings for the token relay. This is the only place the client secret
/// is ever read.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub server_addr: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub token_url: String,
    pub api_base_url: String,
    pub relay_key: String,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_addr: optional("SPOTVIEW_RELAY_ADDRESS", DEFAULT_RELAY_ADDRESS),
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            redirect_uri: required("SPOTIFY_API_REDIRECT_URI")?,
            token_url: optional("SPOTIFY_API_TOKEN_URL", SPOTIFY_TOKEN_URL),
            api_base_url: optional("SPOTIFY_API_URL", SPOTIFY_API_URL),
            relay_key: required("SPOTVIEW_RELAY_KEY")?,
        })
    }
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{name} must be set"))),
    }
}

fn optional(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_falls_back_to_default() {
        assert_eq!(
            optional("SPOTVIEW_TEST_SURELY_UNSET_VARIABLE", SPOTIFY_API_URL),
            SPOTIFY_API_URL
        );
    }

    #[test]
    fn required_reports_the_variable_name() {
        let err = required("SPOTVIEW_TEST_SURELY_UNSET_VARIABLE").unwrap_err();
        assert!(err.to_string().contains("SPOTVIEW_TEST_SURELY_UNSET_VARIABLE"));
    }

    #[test]
    fn client_config_defaults_to_spotify_endpoints() {
        let config =
            ClientConfig::new("id", "http://127.0.0.1:8080/callback", "http://relay", "key");
        assert_eq!(config.api_base_url, SPOTIFY_API_URL);
        assert_eq!(config.auth_url, SPOTIFY_AUTH_URL);
        assert_eq!(config.scopes.len(), 7);
    }
}
