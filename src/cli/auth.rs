use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;
use url::Url;

use crate::{
    config::ClientConfig,
    error, info,
    management::{AuthManager, FileAuthorizationStore},
    server, success,
    spotify::{client::SpotifyClient, relay::RelayClient},
    warning,
};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

pub fn manager(config: &ClientConfig) -> AuthManager<FileAuthorizationStore> {
    AuthManager::new(
        config.clone(),
        RelayClient::from_config(config),
        FileAuthorizationStore::default(),
    )
}

/// Runs the status check against a redirect URI without callback
/// parameters, which refreshes an expired token if a refresh token is stored.
async fn check(auth: &mut AuthManager<FileAuthorizationStore>, config: &ClientConfig) -> bool {
    let mut location = match Url::parse(&config.redirect_uri) {
        Ok(url) => url,
        Err(e) => error!("Invalid SPOTIFY_API_REDIRECT_URI: {}", e),
    };

    match auth.check(&mut location).await {
        Ok(status) => status.authenticated,
        Err(e) => error!("Cannot read authorization state. Err: {}", e),
    }
}

/// Builds a resource client from the stored token, refreshing it first when
/// it expired. Exits when the user is not logged in.
pub async fn authorized_client(config: &ClientConfig) -> SpotifyClient {
    let mut auth = manager(config);
    check(&mut auth, config).await;

    let token = match auth.access_token().await {
        Ok(token) => token,
        Err(e) => error!("Cannot read authorization state. Err: {}", e),
    };

    match SpotifyClient::new(token.as_deref(), &config.api_base_url) {
        Ok(client) => client,
        Err(e) => error!("{}", e),
    }
}

pub async fn login(config: &ClientConfig) {
    let mut auth = manager(config);
    if check(&mut auth, config).await {
        info!("Already authenticated. Run spotview logout first to switch accounts.");
        return;
    }

    let slot: Arc<Mutex<Option<Url>>> = Arc::new(Mutex::new(None));
    let listener = match server::start_callback_server(
        &config.server_addr,
        &config.redirect_uri,
        Arc::clone(&slot),
    )
    .await
    {
        Ok(handle) => handle,
        Err(e) => error!("Failed to start callback listener: {}", e),
    };

    let auth_url = match auth.login().await {
        Ok(url) => url,
        Err(e) => error!("Failed to prepare login: {}", e),
    };

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let redirect = wait_for_redirect(slot).await;
    listener.abort();

    let Some(mut location) = redirect else {
        error!("Authentication failed or timed out.");
    };

    match auth.check(&mut location).await {
        Ok(status) if status.authenticated => success!("Authentication successful!"),
        Ok(_) => error!("Authentication failed."),
        Err(e) => error!("Failed to save token: {}", e),
    }
}

pub async fn logout(config: &ClientConfig) {
    let mut auth = manager(config);
    match auth.logout().await {
        Ok(()) => success!("Logged out."),
        Err(e) => error!("Failed to clear authorization state: {}", e),
    }
}

pub async fn status(config: &ClientConfig) {
    let mut auth = manager(config);
    if check(&mut auth, config).await {
        success!("Authenticated with Spotify.");
    } else {
        info!("Not authenticated. Run spotview login.");
    }
}

async fn wait_for_redirect(slot: Arc<Mutex<Option<Url>>>) -> Option<Url> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < LOGIN_TIMEOUT {
        let lock = slot.lock().await;
        if let Some(location) = lock.as_ref() {
            return Some(location.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    None
}
