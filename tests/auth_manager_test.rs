mod common;

use pretty_assertions::assert_eq;
use serde_json::json;
use spotview::{
    management::{AuthManager, AuthorizationStore, FileAuthorizationStore},
    spotify::relay::RelayClient,
    types::{AuthStatus, AuthorizationState},
};
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{REDIRECT_URI, RELAY_KEY, TestClock, full_state, manager};

const T: i64 = 1_700_000_000_000;

fn plain_location() -> Url {
    Url::parse(REDIRECT_URI).unwrap()
}

fn callback_location(code: &str, state: &str) -> Url {
    Url::parse(&format!("{REDIRECT_URI}?code={code}&state={state}")).unwrap()
}

async fn forbid_any_relay_call(server: &MockServer) {
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn status_is_loading_before_the_first_check() {
    let relay = MockServer::start().await;
    let clock = TestClock::at(T);
    let (auth, _) = manager(&relay, AuthorizationState::default(), &clock);

    assert_eq!(auth.status(), AuthStatus::LOADING);
}

#[tokio::test]
async fn valid_stored_token_is_trusted_without_network() {
    let relay = MockServer::start().await;
    forbid_any_relay_call(&relay).await;

    let clock = TestClock::at(T);
    let (mut auth, store) = manager(&relay, full_state(T + 1), &clock);

    let status = auth.check(&mut plain_location()).await.unwrap();

    assert_eq!(status, AuthStatus::AUTHENTICATED);
    assert_eq!(auth.status(), AuthStatus::AUTHENTICATED);
    assert_eq!(store.snapshot(), full_state(T + 1));
}

#[tokio::test]
async fn nothing_stored_and_no_code_is_unauthenticated() {
    let relay = MockServer::start().await;
    forbid_any_relay_call(&relay).await;

    let clock = TestClock::at(T);
    let (mut auth, _) = manager(&relay, AuthorizationState::default(), &clock);

    let status = auth.check(&mut plain_location()).await.unwrap();
    assert_eq!(status, AuthStatus::UNAUTHENTICATED);
}

#[tokio::test]
async fn expired_token_is_refreshed_exactly_once() {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/refresh"))
        .and(query_param("refresh_token", "old-refresh"))
        .and(header("authorization", format!("Bearer {RELAY_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&relay)
        .await;

    let clock = TestClock::at(T);
    let (mut auth, store) = manager(&relay, full_state(T), &clock);

    let status = auth.check(&mut plain_location()).await.unwrap();
    assert_eq!(status, AuthStatus::AUTHENTICATED);

    let state = store.snapshot();
    assert_eq!(state.access_token.as_deref(), Some("new-access"));
    assert_eq!(state.refresh_token.as_deref(), Some("old-refresh"));
    assert_eq!(state.expiry_timestamp, Some(T + 3_600_000));
    assert!(state.expiry_timestamp.unwrap() > clock.now());
}

#[tokio::test]
async fn rotated_refresh_token_replaces_the_old_one() {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh",
            "expires_in": 60
        })))
        .expect(1)
        .mount(&relay)
        .await;

    let clock = TestClock::at(T);
    let (mut auth, store) = manager(&relay, full_state(T - 10), &clock);

    auth.check(&mut plain_location()).await.unwrap();
    assert_eq!(store.snapshot().refresh_token.as_deref(), Some("new-refresh"));
}

#[tokio::test]
async fn failed_refresh_clears_every_field() {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Refresh token revoked",
            "status": 400
        })))
        .expect(1)
        .mount(&relay)
        .await;

    let clock = TestClock::at(T);
    let (mut auth, store) = manager(&relay, full_state(T - 1), &clock);

    let status = auth.check(&mut plain_location()).await.unwrap();

    assert_eq!(status, AuthStatus::UNAUTHENTICATED);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn unreachable_relay_counts_as_a_failed_refresh() {
    let relay = MockServer::start().await;
    let clock = TestClock::at(T);
    let (mut auth, store) = manager(&relay, full_state(T - 1), &clock);
    drop(relay);

    let status = auth.check(&mut plain_location()).await.unwrap();

    assert_eq!(status, AuthStatus::UNAUTHENTICATED);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn code_exchange_stores_tokens_and_strips_the_callback() {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/callback"))
        .and(query_param("code", "auth-code"))
        .and(header("authorization", format!("Bearer {RELAY_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-access",
            "refresh_token": "fresh-refresh",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&relay)
        .await;

    let clock = TestClock::at(T);
    let initial = AuthorizationState {
        csrf_state: Some("expected-state".to_string()),
        ..Default::default()
    };
    let (mut auth, store) = manager(&relay, initial, &clock);

    let mut location = callback_location("auth-code", "expected-state");
    let status = auth.check(&mut location).await.unwrap();

    assert_eq!(status, AuthStatus::AUTHENTICATED);
    assert_eq!(location.as_str(), REDIRECT_URI);
    assert_eq!(
        store.snapshot(),
        AuthorizationState {
            access_token: Some("fresh-access".to_string()),
            refresh_token: Some("fresh-refresh".to_string()),
            expiry_timestamp: Some(T + 3_600_000),
            csrf_state: None,
        }
    );
}

#[tokio::test]
async fn token_expires_exactly_after_expires_in() {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/callback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-access",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&relay)
        .await;

    let clock = TestClock::at(T);
    let initial = AuthorizationState {
        csrf_state: Some("s".to_string()),
        ..Default::default()
    };
    let (mut auth, store) = manager(&relay, initial, &clock);

    let status = auth.check(&mut callback_location("c", "s")).await.unwrap();
    assert_eq!(status, AuthStatus::AUTHENTICATED);
    assert_eq!(store.snapshot().expiry_timestamp, Some(T + 3_600_000));
    assert_eq!(store.snapshot().refresh_token, None);

    clock.set(T + 3_600_001);
    let status = auth.check(&mut plain_location()).await.unwrap();
    assert_eq!(status, AuthStatus::UNAUTHENTICATED);
}

#[tokio::test]
async fn failed_code_exchange_clears_every_field() {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/callback"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Invalid authorization code",
            "status": 400
        })))
        .expect(1)
        .mount(&relay)
        .await;

    let clock = TestClock::at(T);
    let mut initial = full_state(T - 1);
    initial.csrf_state = Some("state".to_string());
    let (mut auth, store) = manager(&relay, initial, &clock);

    let mut location = callback_location("bad-code", "state");
    let status = auth.check(&mut location).await.unwrap();

    assert_eq!(status, AuthStatus::UNAUTHENTICATED);
    assert!(store.snapshot().is_empty());
    assert_eq!(location.query(), None);
}

#[tokio::test]
async fn mismatched_state_rejects_the_callback_without_exchanging() {
    let relay = MockServer::start().await;
    forbid_any_relay_call(&relay).await;

    let clock = TestClock::at(T);
    let mut initial = full_state(T - 1);
    initial.csrf_state = Some("the-real-state".to_string());
    let (mut auth, store) = manager(&relay, initial, &clock);

    let status = auth
        .check(&mut callback_location("code", "forged-state"))
        .await
        .unwrap();

    assert_eq!(status, AuthStatus::UNAUTHENTICATED);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn callback_without_any_stored_state_is_rejected() {
    let relay = MockServer::start().await;
    forbid_any_relay_call(&relay).await;

    let clock = TestClock::at(T);
    let (mut auth, _) = manager(&relay, AuthorizationState::default(), &clock);

    let status = auth
        .check(&mut callback_location("code", "anything"))
        .await
        .unwrap();
    assert_eq!(status, AuthStatus::UNAUTHENTICATED);
}

#[tokio::test]
async fn code_takes_precedence_over_a_stored_refresh_token() {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/callback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "from-code",
            "refresh_token": "refresh-from-code",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&relay)
        .await;
    Mock::given(method("GET"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&relay)
        .await;

    let clock = TestClock::at(T);
    let mut initial = full_state(T - 1);
    initial.csrf_state = Some("state".to_string());
    let (mut auth, store) = manager(&relay, initial, &clock);

    auth.check(&mut callback_location("code", "state"))
        .await
        .unwrap();
    assert_eq!(store.snapshot().access_token.as_deref(), Some("from-code"));
}

#[tokio::test]
async fn login_persists_a_fresh_state_and_builds_the_authorize_url() {
    let relay = MockServer::start().await;
    forbid_any_relay_call(&relay).await;

    let clock = TestClock::at(T);
    let (mut auth, store) = manager(&relay, full_state(T + 1), &clock);

    let url = auth.login().await.unwrap();
    let first_state = store.snapshot().csrf_state.unwrap();
    assert_ne!(first_state, "csrf-1234567890ab");

    let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
    assert_eq!(url.origin().ascii_serialization(), "https://accounts.spotify.com");
    assert_eq!(url.path(), "/authorize");
    assert_eq!(params["client_id"], "client-id");
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["redirect_uri"], REDIRECT_URI);
    assert_eq!(params["state"], first_state);

    let scopes: Vec<&str> = params["scope"].split(' ').collect();
    for scope in [
        "user-read-private",
        "user-read-email",
        "user-top-read",
        "user-read-currently-playing",
        "user-read-playback-state",
        "user-modify-playback-state",
        "user-follow-read",
    ] {
        assert!(scopes.contains(&scope), "missing scope {scope}");
    }

    auth.login().await.unwrap();
    let second_state = store.snapshot().csrf_state.unwrap();
    assert_ne!(first_state, second_state);

    // tokens survive a new login round
    assert_eq!(store.snapshot().access_token.as_deref(), Some("old-access"));
}

#[tokio::test]
async fn logout_clears_everything() {
    let relay = MockServer::start().await;
    let clock = TestClock::at(T);
    let (mut auth, store) = manager(&relay, full_state(T + 1_000), &clock);

    auth.check(&mut plain_location()).await.unwrap();
    auth.logout().await.unwrap();

    assert_eq!(auth.status(), AuthStatus::UNAUTHENTICATED);
    assert!(store.load().await.unwrap().is_empty());
    assert_eq!(auth.access_token().await.unwrap(), None);
}

#[tokio::test]
async fn access_token_is_only_handed_out_while_valid() {
    let relay = MockServer::start().await;
    let clock = TestClock::at(T);
    let (auth, _) = manager(&relay, full_state(T + 5), &clock);

    assert_eq!(auth.access_token().await.unwrap().as_deref(), Some("old-access"));
    clock.set(T + 5);
    assert_eq!(auth.access_token().await.unwrap(), None);
}

#[tokio::test]
async fn unreadable_store_settles_as_unauthenticated() {
    let relay = MockServer::start().await;
    forbid_any_relay_call(&relay).await;

    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("authorization.json");
    std::fs::write(&file, "{ not json").unwrap();

    let config = common::client_config(&relay);
    let mut auth = AuthManager::new(
        config.clone(),
        RelayClient::from_config(&config),
        FileAuthorizationStore::new(file),
    );

    let result = auth.check(&mut plain_location()).await;
    assert!(result.is_err());
    assert_eq!(auth.status(), AuthStatus::UNAUTHENTICATED);
}
