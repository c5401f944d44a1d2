use std::sync::Arc;

use url::Url;

use crate::{
    config::ClientConfig,
    error::{Error, Result},
    management::AuthorizationStore,
    scope::ToScopesString,
    spotify::relay::RelayClient,
    types::{AuthStatus, AuthorizationState, TokenResponse},
    utils::{self, CallbackParams},
    warning,
};

type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Debug, Clone, Copy)]
enum Grant {
    AuthorizationCode,
    RefreshToken,
}

/// Owns the client side of the authorization lifecycle.
///
/// The persisted [`AuthorizationState`] is only ever changed through this
/// type: [`check`](Self::check), [`login`](Self::login) and
/// [`logout`](Self::logout) each run to completion on `&mut self`.
pub struct AuthManager<S> {
    config: ClientConfig,
    relay: RelayClient,
    store: S,
    status: AuthStatus,
    clock: Clock,
}

impl<S: AuthorizationStore> AuthManager<S> {
    pub fn new(config: ClientConfig, relay: RelayClient, store: S) -> Self {
        Self {
            config,
            relay,
            store,
            status: AuthStatus::LOADING,
            clock: Arc::new(utils::now_millis),
        }
    }

    /// Replaces the epoch-millisecond clock used for expiry decisions.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Last known status; `loading` until [`check`](Self::check) has run.
    pub fn status(&self) -> AuthStatus {
        self.status
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Decides whether the user is authenticated, in this order:
    ///
    /// 1. a stored access token that has not expired is trusted as is;
    /// 2. otherwise an authorization `code` on `location` is exchanged through
    ///    the relay (after the csrf state is checked);
    /// 3. otherwise a stored refresh token is traded for a new access token.
    ///
    /// `code` and `state` are removed from `location` whenever present, so the
    /// same callback URL cannot be replayed. A rejected exchange or refresh
    /// wipes all persisted fields and yields an unauthenticated status. Only
    /// store failures are returned as errors, and leave the status
    /// unauthenticated.
    pub async fn check(&mut self, location: &mut Url) -> Result<AuthStatus> {
        self.status = AuthStatus::LOADING;
        match self.resolve(location).await {
            Ok(authenticated) => Ok(self.settle(authenticated)),
            Err(e) => {
                self.settle(false);
                Err(e)
            }
        }
    }

    /// Starts a new authorization round.
    ///
    /// Generates and persists a fresh csrf state, then returns the provider
    /// URL the user has to visit. Tokens already stored are left untouched.
    pub async fn login(&mut self) -> Result<Url> {
        let csrf_state = utils::generate_csrf_state();

        let mut state = self.store.load().await?;
        state.csrf_state = Some(csrf_state.clone());
        self.store.save(&state).await?;

        let scope = self.config.scopes.iter().copied().to_scopes_string();
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("state", csrf_state.as_str()),
                ("scope", scope.as_str()),
            ],
        )?;
        Ok(url)
    }

    /// Forgets every persisted field.
    pub async fn logout(&mut self) -> Result<()> {
        self.store.clear().await?;
        self.status = AuthStatus::UNAUTHENTICATED;
        Ok(())
    }

    /// Stored access token if it is still valid.
    pub async fn access_token(&self) -> Result<Option<String>> {
        let state = self.store.load().await?;
        Ok(state.valid_access_token(self.now()).map(str::to_string))
    }

    async fn resolve(&self, location: &mut Url) -> Result<bool> {
        let state = self.store.load().await?;

        if state.valid_access_token(self.now()).is_some() {
            utils::take_callback_params(location);
            return Ok(true);
        }

        let callback = utils::take_callback_params(location);
        if let Some(code) = callback.code.as_deref() {
            return match self.exchange(&state, code, &callback).await {
                Ok(tokens) => {
                    self.store_tokens(state, tokens, Grant::AuthorizationCode)
                        .await?;
                    Ok(true)
                }
                Err(e) => {
                    warning!("Error exchanging code for token: {}", e);
                    self.store.clear().await?;
                    Ok(false)
                }
            };
        }

        if let Some(refresh_token) = state.refresh_token.clone() {
            return match self.relay.refresh(&refresh_token).await {
                Ok(tokens) => {
                    self.store_tokens(state, tokens, Grant::RefreshToken).await?;
                    Ok(true)
                }
                Err(e) => {
                    warning!("Error refreshing token: {}", e);
                    self.store.clear().await?;
                    Ok(false)
                }
            };
        }

        Ok(false)
    }

    async fn exchange(
        &self,
        state: &AuthorizationState,
        code: &str,
        callback: &CallbackParams,
    ) -> Result<TokenResponse> {
        match (state.csrf_state.as_deref(), callback.state.as_deref()) {
            (Some(expected), Some(given)) if utils::secrets_match(expected, given) => {}
            _ => return Err(Error::StateMismatch),
        }
        self.relay.exchange_code(code).await
    }

    async fn store_tokens(
        &self,
        mut state: AuthorizationState,
        tokens: TokenResponse,
        grant: Grant,
    ) -> Result<()> {
        let expires_in_ms = i64::try_from(tokens.expires_in)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);

        state.access_token = Some(tokens.access_token);
        state.expiry_timestamp = Some(self.now().saturating_add(expires_in_ms));
        match grant {
            Grant::AuthorizationCode => {
                state.refresh_token = tokens.refresh_token;
                // single use
                state.csrf_state = None;
            }
            Grant::RefreshToken => {
                if let Some(refresh_token) = tokens.refresh_token {
                    state.refresh_token = Some(refresh_token);
                }
            }
        }

        self.store.save(&state).await
    }

    fn settle(&mut self, authenticated: bool) -> AuthStatus {
        self.status = if authenticated {
            AuthStatus::AUTHENTICATED
        } else {
            AuthStatus::UNAUTHENTICATED
        };
        self.status
    }

    fn now(&self) -> i64 {
        (self.clock)()
    }
}
