use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Extension, Router,
    extract::RawQuery,
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    response::Html,
    routing::{get, post},
};
use tokio::{net::TcpListener, sync::Mutex, task::JoinHandle};
use tower_http::cors::{Any, CorsLayer};
use url::Url;

use crate::{
    api::{self, RelayState},
    config::RelayConfig,
    error::{Error, Result},
    info,
    spotify::RELAY_SPOTIFY_TOKEN_HEADER,
};

/// Router of the token relay.
pub fn relay_router(state: Arc<RelayState>) -> Router {
    let protected = Router::new()
        .route("/callback", get(api::callback))
        .route("/refresh", get(api::refresh))
        .route("/top-tracks", get(api::top_tracks))
        .route("/currently-playing", get(api::currently_playing))
        .route("/followed-artists", get(api::followed_artists))
        .route("/play", post(api::play))
        .route("/pause", post(api::pause))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_relay_key,
        ));

    Router::new()
        .route("/health", get(api::health))
        .merge(protected)
        .fallback(api::unknown_endpoint)
        .layer(cors())
        .with_state(state)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static(RELAY_SPOTIFY_TOKEN_HEADER),
        ])
}

/// Binds the relay to `config.server_addr` and serves until the process ends.
pub async fn start_relay_server(config: RelayConfig) -> Result<()> {
    let addr = parse_addr(&config.server_addr)?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Relay listening on http://{}", addr);
    serve_relay(listener, &config).await
}

/// Serves the relay on an already bound listener.
pub async fn serve_relay(listener: TcpListener, config: &RelayConfig) -> Result<()> {
    let app = relay_router(Arc::new(RelayState::new(config)));
    axum::serve(listener, app).await?;
    Ok(())
}

/// Starts the local listener that catches the login redirect.
///
/// The full redirect URL, query included, is written into `slot` once the
/// provider sends the browser back. The listener keeps running until the
/// returned handle is aborted.
pub async fn start_callback_server(
    addr: &str,
    redirect_uri: &str,
    slot: Arc<Mutex<Option<Url>>>,
) -> Result<JoinHandle<()>> {
    let redirect = Url::parse(redirect_uri)?;
    let path = redirect.path().to_string();

    let app = Router::new()
        .route("/health", get(api::health))
        .route(&path, get(login_redirect))
        .layer(Extension(slot))
        .layer(Extension(Arc::new(redirect)));

    let listener = TcpListener::bind(parse_addr(addr)?).await?;
    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            crate::warning!("Callback listener stopped: {}", e);
        }
    }))
}

async fn login_redirect(
    RawQuery(query): RawQuery,
    Extension(slot): Extension<Arc<Mutex<Option<Url>>>>,
    Extension(redirect): Extension<Arc<Url>>,
) -> Html<&'static str> {
    let mut location = (*redirect).clone();
    location.set_query(query.as_deref());

    let mut lock = slot.lock().await;
    *lock = Some(location);

    Html("<h2>Authorization received.</h2><p>Close browser window.</p>")
}

fn parse_addr(addr: &str) -> Result<SocketAddr> {
    SocketAddr::from_str(addr)
        .map_err(|e| Error::Config(format!("invalid server address {addr}: {e}")))
}
