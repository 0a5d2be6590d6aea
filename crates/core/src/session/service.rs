//! Session orchestrator - core business logic
//!
//! State machine: `Loading` on construction, then exactly one boot moves it
//! to authenticated or unauthenticated. `login`, `logout`,
//! `get_access_token` and `ensure_authenticated` all wait for boot first.

use std::sync::Arc;
use std::time::Duration;

use tabauth_common::time::Clock;
use tabauth_common::validate_state;
use tabauth_domain::{AuthConfig, AuthError, Result, SessionState, TokenSet};
use tokio::sync::{watch, OnceCell};
use tracing::{debug, info, warn};
use url::Url;

use super::callback::{detect_callback, strip_callback_params, Callback};
use crate::oidc::{build_authorization_request, logout_url, nonce_claim};
use crate::ports::{KeyValueStorage, Navigator, OidcClient};
use crate::refresh_lock::RefreshCoordinator;
use crate::token_store::TokenStore;

/// Explicit session object, one per page/tab
///
/// State is published through a `watch` channel; dropping the orchestrator
/// closes it.
pub struct SessionOrchestrator {
    config: AuthConfig,
    store: TokenStore,
    lock: RefreshCoordinator,
    oidc: Arc<dyn OidcClient>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    state: watch::Sender<SessionState>,
    booted: OnceCell<()>,
}

impl SessionOrchestrator {
    /// Create an orchestrator in the `Loading` state
    ///
    /// Nothing is read until [`boot`](Self::boot) runs, either explicitly or
    /// through the first operation that needs a settled session.
    pub fn new(
        config: AuthConfig,
        storage: Arc<dyn KeyValueStorage>,
        oidc: Arc<dyn OidcClient>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::loading());
        Self {
            lock: RefreshCoordinator::new(storage.clone(), clock.clone()),
            store: TokenStore::new(storage),
            config,
            oidc,
            navigator,
            clock,
            state,
            booted: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Receiver observing every published state
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Run the boot sequence once; later and concurrent calls wait for it
    ///
    /// Boot never fails: any error clears persisted credentials and is
    /// published as the state's `error` message.
    pub async fn boot(&self) {
        self.booted.get_or_init(|| self.run_boot()).await;
    }

    /// Start the authorization code flow
    ///
    /// Persists the PKCE artifacts and navigates to the provider. The flow
    /// resumes only through callback detection on the next boot.
    ///
    /// # Arguments
    /// * `redirect_target` - In-app location to resume at, sent as `app_state`.
    ///   Falls back to `default_app_redirect`, then the current path.
    ///
    /// # Errors
    /// Returns configuration, storage or navigation errors
    pub async fn login(&self, redirect_target: Option<&str>) -> Result<()> {
        self.boot().await;

        let app_state = redirect_target
            .map(str::to_string)
            .or_else(|| self.config.default_app_redirect.clone())
            .or_else(|| current_path(&self.navigator.current_url()));

        let request = build_authorization_request(&self.config, app_state.as_deref())?;
        self.store.save_pkce(&request.pkce)?;

        info!(app_state = app_state.as_deref().unwrap_or(""), "session.login.redirecting");
        self.navigator.assign(&request.url)
    }

    /// Clear credentials, publish unauthenticated and leave through the
    /// provider's end-session endpoint when one is configured
    ///
    /// # Errors
    /// Returns the first storage error after navigation has been attempted,
    /// or a configuration or navigation error
    pub async fn logout(&self) -> Result<()> {
        self.boot().await;

        let cleared = self.store.clear_all();
        self.publish(SessionState::unauthenticated());
        info!("session.logout.cleared");

        if let Some(target) = logout_url(&self.config)? {
            debug!("session.logout.redirecting");
            self.navigator.assign(&target)?;
        }
        cleared
    }

    /// Current access token, refreshed first when due
    ///
    /// Returns `Ok(None)` when there is no session or the stored token is
    /// expired beyond clock skew and could not be refreshed.
    ///
    /// # Errors
    /// Returns the refresh error when this session performed the refresh and
    /// it failed
    pub async fn get_access_token(&self) -> Result<Option<String>> {
        self.boot().await;

        match self.refresh_if_needed().await? {
            Some(tokens) if !tokens.is_expired(self.clock.now_secs(), self.config.clock_skew_seconds) => {
                self.sync_tokens(&tokens);
                Ok(Some(tokens.access_token))
            }
            Some(_) => {
                debug!("session.access_token.expired");
                Ok(None)
            }
            None => {
                self.state.send_if_modified(|state| {
                    let was_authenticated = state.is_authenticated;
                    if was_authenticated {
                        *state = SessionState::unauthenticated();
                    }
                    was_authenticated
                });
                Ok(None)
            }
        }
    }

    /// Route guard: `true` when authenticated, otherwise starts login
    ///
    /// # Errors
    /// Returns any error from [`login`](Self::login)
    pub async fn ensure_authenticated(&self, redirect_target: Option<&str>) -> Result<bool> {
        self.boot().await;
        if self.state.borrow().is_authenticated {
            return Ok(true);
        }
        self.login(redirect_target).await?;
        Ok(false)
    }

    async fn run_boot(&self) {
        info!("session.boot.started");
        match self.try_boot().await {
            Ok(state) => {
                info!(authenticated = state.is_authenticated, "session.boot.completed");
                self.publish(state);
            }
            Err(e) => {
                warn!(
                    error = %e,
                    callback_validation = e.is_callback_validation(),
                    "session.boot.failed"
                );
                if let Err(clear_err) = self.store.clear_all() {
                    warn!(error = %clear_err, "session.boot.clear_failed");
                }
                self.publish(SessionState::failed(e.to_string()));
            }
        }
    }

    async fn try_boot(&self) -> Result<SessionState> {
        let location = self.navigator.current_url();
        if let Some(callback) = detect_callback(&location) {
            let outcome = self.complete_callback(callback).await;
            self.strip_location(&location);
            return outcome;
        }

        let Some(tokens) = self.store.load() else {
            debug!("session.boot.no_tokens");
            return Ok(SessionState::unauthenticated());
        };

        let now = self.clock.now_secs();
        if self.refresh_applies(&tokens)
            && tokens.is_due_for_refresh(now, self.config.refresh_leeway_seconds)
        {
            let refreshed = self.refresh_if_needed().await?;
            let now = self.clock.now_secs();
            return Ok(match refreshed {
                Some(next) if !next.is_expired(now, self.config.clock_skew_seconds) => {
                    SessionState::authenticated(next, self.store.load_user())
                }
                _ => {
                    info!("session.boot.no_usable_tokens");
                    SessionState::unauthenticated()
                }
            });
        }

        if tokens.is_expired(now, self.config.clock_skew_seconds) {
            info!("session.boot.tokens_expired");
            self.store.clear_all()?;
            return Ok(SessionState::unauthenticated());
        }

        Ok(SessionState::authenticated(tokens, self.store.load_user()))
    }

    /// Validate the returned state against storage, then exchange the code
    ///
    /// PKCE artifacts are consumed before any check so they cannot be reused.
    async fn complete_callback(&self, callback: Callback) -> Result<SessionState> {
        let pending = self.store.take_pkce()?;

        let (code, returned_state) = match callback {
            Callback::Error { error, description, .. } => {
                warn!(error = %error, "session.boot.provider_error");
                return Err(AuthError::Provider { error, description });
            }
            Callback::Code { code, state } => (code, state),
        };

        let (Some(expected_state), Some(verifier)) = (pending.state, pending.verifier) else {
            return Err(AuthError::CallbackValidation(
                "no pending authorization (state/verifier missing)".to_string(),
            ));
        };
        if !validate_state(&expected_state, &returned_state) {
            return Err(AuthError::CallbackValidation("state mismatch".to_string()));
        }

        let tokens = self.oidc.exchange_code(&code, &verifier).await?;
        check_nonce(&tokens, pending.nonce.as_deref())?;
        self.store.save(&tokens)?;

        let user = self.oidc.fetch_user_info(&tokens.access_token).await?;
        self.store.save_user(&user)?;

        info!("session.boot.callback_completed");
        Ok(SessionState::authenticated(tokens, Some(user)))
    }

    /// Shared refresh path for boot and `get_access_token`
    ///
    /// Returns the persisted tokens unchanged when no refresh is due. When
    /// another session holds the lock, waits for it and returns whatever is
    /// persisted afterwards.
    async fn refresh_if_needed(&self) -> Result<Option<TokenSet>> {
        let Some(tokens) = self.store.load() else {
            return Ok(None);
        };
        if !self.refresh_applies(&tokens)
            || !tokens.is_due_for_refresh(self.clock.now_secs(), self.config.refresh_leeway_seconds)
        {
            return Ok(Some(tokens));
        }

        let key = self.config.refresh_lock_key.as_str();
        if !self.lock.acquire(key, self.config.refresh_lock_ttl_ms)? {
            info!("session.refresh.waiting_for_peer");
            let timeout = Duration::from_millis(self.config.refresh_wait_timeout_ms);
            self.lock.wait_for_release(key, timeout).await;
            return Ok(self.store.load());
        }

        let outcome = self.refresh_locked(&tokens).await;
        if let Err(e) = self.lock.release(key) {
            warn!(error = %e, "session.refresh.release_failed");
        }
        outcome.map(Some)
    }

    async fn refresh_locked(&self, tokens: &TokenSet) -> Result<TokenSet> {
        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .ok_or_else(|| AuthError::Internal("refresh attempted without a refresh token".into()))?;

        let next = match self.oidc.refresh_tokens(refresh_token).await {
            Ok(next) => next,
            Err(e) => {
                warn!(error = %e, "session.refresh.failed");
                return Err(e);
            }
        };
        self.store.save(&next)?;
        self.sync_tokens(&next);

        info!(
            expires_in_secs = next.seconds_until_expiry(self.clock.now_secs()),
            rotated = next.refresh_token.as_deref() != Some(refresh_token),
            "session.refresh.completed"
        );
        Ok(next)
    }

    fn refresh_applies(&self, tokens: &TokenSet) -> bool {
        self.config.use_refresh_token && tokens.can_refresh()
    }

    /// Publish newer tokens to a settled, authenticated state
    fn sync_tokens(&self, tokens: &TokenSet) {
        self.state.send_if_modified(|state| {
            if state.is_loading || !state.is_authenticated || state.tokens.as_ref() == Some(tokens) {
                return false;
            }
            state.tokens = Some(tokens.clone());
            true
        });
    }

    fn strip_location(&self, location: &str) {
        let Some(clean) = strip_callback_params(location) else {
            return;
        };
        if let Err(e) = self.navigator.replace(&clean) {
            warn!(error = %e, "session.boot.strip_failed");
        }
    }

    fn publish(&self, state: SessionState) {
        self.state.send_replace(state);
    }
}

/// Compare the ID token's nonce claim with the stored nonce, when both exist
fn check_nonce(tokens: &TokenSet, expected: Option<&str>) -> Result<()> {
    let (Some(id_token), Some(expected)) = (tokens.id_token.as_deref(), expected) else {
        return Ok(());
    };
    match nonce_claim(id_token) {
        Ok(Some(claim)) if !validate_state(expected, &claim) => {
            Err(AuthError::CallbackValidation("nonce mismatch".to_string()))
        }
        Ok(_) => Ok(()),
        Err(e) => {
            warn!(error = %e, "session.boot.id_token_unreadable");
            Ok(())
        }
    }
}

fn current_path(location: &str) -> Option<String> {
    Url::parse(location).ok().map(|url| url.path().to_string())
}
