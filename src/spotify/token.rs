use reqwest::{Client, header::AUTHORIZATION};
use serde_json::Value;

use crate::{
    config::RelayConfig,
    error::{Error, Result},
    spotify::error_message,
    utils,
};

/// Spotify accounts service token endpoint, authenticated with the client
/// id/secret pair. Only the relay constructs one of these.
#[derive(Debug, Clone)]
pub struct TokenEndpoint {
    http: Client,
    token_url: String,
    redirect_uri: String,
    credential: String,
}

impl TokenEndpoint {
    pub fn new(http: Client, config: &RelayConfig) -> Self {
        Self {
            http,
            token_url: config.token_url.clone(),
            redirect_uri: config.redirect_uri.clone(),
            credential: utils::basic_credential(&config.client_id, &config.client_secret),
        }
    }

    /// Exchanges an authorization code for an access and refresh token.
    ///
    /// The response body is returned as Spotify sent it.
    pub async fn exchange_code(&self, code: &str) -> Result<Value> {
        self.request(
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ],
            "Failed to exchange code for token",
        )
        .await
    }

    /// Exchanges a refresh token for a new access token. Spotify may or may not
    /// rotate the refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Value> {
        self.request(
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
            "Failed to refresh token",
        )
        .await
    }

    async fn request(&self, form: &[(&str, &str)], fallback: &str) -> Result<Value> {
        let res = self
            .http
            .post(&self.token_url)
            .header(AUTHORIZATION, &self.credential)
            .form(form)
            .send()
            .await?;

        let status = res.status();
        let body = res.json::<Value>().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(Error::UpstreamApiError {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| fallback.to_string()),
            });
        }
        Ok(body)
    }
}
