#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use spotview::{
    config::ClientConfig,
    management::{AuthManager, MemoryAuthorizationStore},
    spotify::relay::RelayClient,
    types::AuthorizationState,
};
use wiremock::MockServer;

pub const RELAY_KEY: &str = "relay-key";
pub const REDIRECT_URI: &str = "http://127.0.0.1:8080/callback";

/// Manually advanced epoch-millisecond clock.
#[derive(Clone)]
pub struct TestClock(Arc<AtomicI64>);

impl TestClock {
    pub fn at(ms: i64) -> Self {
        Self(Arc::new(AtomicI64::new(ms)))
    }

    pub fn set(&self, ms: i64) {
        self.0.store(ms, Ordering::SeqCst);
    }

    pub fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn client_config(relay: &MockServer) -> ClientConfig {
    ClientConfig::new("client-id", REDIRECT_URI, relay.uri(), RELAY_KEY)
}

pub fn manager(
    relay: &MockServer,
    state: AuthorizationState,
    clock: &TestClock,
) -> (AuthManager<Arc<MemoryAuthorizationStore>>, Arc<MemoryAuthorizationStore>) {
    let store = Arc::new(MemoryAuthorizationStore::with_state(state));
    let config = client_config(relay);
    let clock = clock.clone();
    let manager = AuthManager::new(
        config.clone(),
        RelayClient::from_config(&config),
        Arc::clone(&store),
    )
    .with_clock(move || clock.now());
    (manager, store)
}

pub fn full_state(expiry: i64) -> AuthorizationState {
    AuthorizationState {
        access_token: Some("old-access".to_string()),
        refresh_token: Some("old-refresh".to_string()),
        expiry_timestamp: Some(expiry),
        csrf_state: Some("csrf-1234567890ab".to_string()),
    }
}
