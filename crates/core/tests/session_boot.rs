//! Boot sequence tests for `SessionOrchestrator`
//!
//! Covers callback completion, persisted-session restore and the failure
//! paths that must clear credentials.

mod support;

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use support::{create_test_config, create_test_tokens, TestTab, APP_URL, NOW, REDIRECT_URI};
use tabauth_domain::constants::{NONCE_KEY, PKCE_VERIFIER_KEY, STATE_KEY, TOKENS_KEY, USER_KEY};
use tabauth_domain::{AuthError, SessionState, TokenSet};

const CALLBACK_URL: &str = "https://app.example.com/callback?code=abc&state=xyz";

fn seed_pending_authorization(tab: &TestTab, state: &str) {
    tab.storage.insert(STATE_KEY, state);
    tab.storage.insert(PKCE_VERIFIER_KEY, "verifier-1");
    tab.storage.insert(NONCE_KEY, "nonce-1");
}

fn seed_tokens(tab: &TestTab, tokens: &TokenSet) {
    tab.storage.insert(TOKENS_KEY, serde_json::to_string(tokens).unwrap());
}

fn id_token_with_nonce(nonce: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({ "sub": "user-1", "nonce": nonce }).to_string());
    format!("{header}.{payload}.sig")
}

/// Validates boot behavior for the no stored session scenario.
///
/// Assertions:
/// - Ensures boot ends unauthenticated and not loading.
/// - Ensures no network call and no navigation happened.
#[tokio::test]
async fn boot_without_tokens_or_callback_is_unauthenticated() {
    let tab = TestTab::new(create_test_config(), APP_URL);
    assert!(tab.session.state().is_loading);

    tab.session.boot().await;

    assert_eq!(tab.session.state(), SessionState::unauthenticated());
    assert_eq!(tab.oidc.total_calls(), 0);
    assert!(tab.navigator.assigned().is_empty());
    assert!(tab.navigator.replaced().is_empty());
}

/// Validates boot behavior for the valid callback scenario.
///
/// Assertions:
/// - Confirms the exchange ran once with the returned code and stored verifier.
/// - Confirms userinfo ran once with the new access token.
/// - Confirms the location was replaced without `code`/`state`.
/// - Confirms tokens and profile were persisted and PKCE artifacts removed.
#[tokio::test]
async fn boot_completes_valid_callback() {
    let tab = TestTab::new(create_test_config(), CALLBACK_URL);
    seed_pending_authorization(&tab, "xyz");

    tab.session.boot().await;

    assert_eq!(tab.oidc.exchange_calls(), vec![("abc".to_string(), "verifier-1".to_string())]);
    assert_eq!(tab.oidc.userinfo_calls(), vec!["exchanged-access".to_string()]);
    assert!(tab.oidc.refresh_calls().is_empty());

    let state = tab.session.state();
    assert!(state.is_authenticated);
    assert!(!state.is_loading);
    assert_eq!(state.access_token(), Some("exchanged-access"));
    assert_eq!(state.user, Some(tab.oidc.user()));
    assert_eq!(state.error, None);

    assert_eq!(tab.navigator.replaced(), vec![REDIRECT_URI.to_string()]);
    assert!(tab.navigator.assigned().is_empty());

    assert_eq!(tab.storage.keys(), vec![TOKENS_KEY.to_string(), USER_KEY.to_string()]);
}

/// Validates boot behavior for the mismatched state scenario.
///
/// Assertions:
/// - Ensures the token endpoint is never called.
/// - Ensures the session ends unauthenticated with a callback validation message.
/// - Ensures PKCE artifacts are gone.
#[tokio::test]
async fn boot_rejects_mismatched_state_without_exchange() {
    let tab = TestTab::new(create_test_config(), CALLBACK_URL);
    seed_pending_authorization(&tab, "other-state");

    tab.session.boot().await;

    assert_eq!(tab.oidc.total_calls(), 0);
    let state = tab.session.state();
    assert!(!state.is_authenticated);
    let expected = AuthError::CallbackValidation("state mismatch".into()).to_string();
    assert_eq!(state.error.as_deref(), Some(expected.as_str()));
    assert!(tab.storage.is_empty());
}

#[tokio::test]
async fn boot_rejects_callback_without_stored_state() {
    let tab = TestTab::new(create_test_config(), CALLBACK_URL);
    tab.storage.insert(PKCE_VERIFIER_KEY, "verifier-1");

    tab.session.boot().await;

    assert_eq!(tab.oidc.total_calls(), 0);
    let state = tab.session.state();
    assert!(!state.is_authenticated);
    assert!(state.error.unwrap().starts_with("Invalid auth callback"));
}

#[tokio::test]
async fn boot_rejects_callback_without_stored_verifier() {
    let tab = TestTab::new(create_test_config(), CALLBACK_URL);
    tab.storage.insert(STATE_KEY, "xyz");

    tab.session.boot().await;

    assert_eq!(tab.oidc.total_calls(), 0);
    assert!(tab.session.state().error.unwrap().starts_with("Invalid auth callback"));
}

/// Validates boot behavior for the replayed callback scenario.
///
/// Assertions:
/// - Confirms a second tab booting on the same callback URL cannot exchange again.
#[tokio::test]
async fn callback_artifacts_are_consumed_once() {
    let first = TestTab::new(create_test_config(), CALLBACK_URL);
    seed_pending_authorization(&first, "xyz");
    first.session.boot().await;
    assert!(first.session.state().is_authenticated);

    let replay = TestTab::with_parts(
        create_test_config(),
        CALLBACK_URL,
        first.storage.clone(),
        first.oidc.clone(),
        first.clock.clone(),
    );
    replay.session.boot().await;

    assert_eq!(first.oidc.exchange_calls().len(), 1);
    assert!(!replay.session.state().is_authenticated);
}

#[tokio::test]
async fn boot_reports_provider_error_redirect() {
    let location = "https://app.example.com/callback?error=access_denied&error_description=User%20cancelled&state=xyz";
    let tab = TestTab::new(create_test_config(), location);
    seed_pending_authorization(&tab, "xyz");

    tab.session.boot().await;

    assert_eq!(tab.oidc.total_calls(), 0);
    let state = tab.session.state();
    assert_eq!(
        state.error.as_deref(),
        Some("Authorization server error: access_denied: User cancelled")
    );
    assert_eq!(tab.navigator.replaced(), vec![REDIRECT_URI.to_string()]);
    assert!(tab.storage.is_empty());
}

#[tokio::test]
async fn boot_accepts_matching_nonce() {
    let tab = TestTab::new(create_test_config(), CALLBACK_URL);
    seed_pending_authorization(&tab, "xyz");
    tab.oidc.script_exchange(Ok(
        TokenSet::new("exchanged-access", NOW + 3_600).with_id_token(id_token_with_nonce("nonce-1"))
    ));

    tab.session.boot().await;

    assert!(tab.session.state().is_authenticated);
}

/// Validates boot behavior for the nonce mismatch scenario.
///
/// Assertions:
/// - Ensures an ID token carrying a foreign nonce is rejected before tokens persist.
#[tokio::test]
async fn boot_rejects_mismatched_nonce() {
    let tab = TestTab::new(create_test_config(), CALLBACK_URL);
    seed_pending_authorization(&tab, "xyz");
    tab.oidc.script_exchange(Ok(
        TokenSet::new("exchanged-access", NOW + 3_600).with_id_token(id_token_with_nonce("injected"))
    ));

    tab.session.boot().await;

    let state = tab.session.state();
    assert!(!state.is_authenticated);
    assert_eq!(state.error.as_deref(), Some("Invalid auth callback: nonce mismatch"));
    assert!(tab.oidc.userinfo_calls().is_empty());
    assert!(tab.storage.value(TOKENS_KEY).is_none());
}

#[tokio::test]
async fn boot_surfaces_exchange_failure_as_message() {
    let tab = TestTab::new(create_test_config(), CALLBACK_URL);
    seed_pending_authorization(&tab, "xyz");
    tab.oidc.script_exchange(Err(AuthError::http_status(400, "Token exchange")));

    tab.session.boot().await;

    let state = tab.session.state();
    assert!(!state.is_authenticated);
    assert_eq!(state.error.as_deref(), Some("Token exchange failed (400)"));
    assert!(tab.storage.is_empty());
}

/// Validates boot behavior for the expired session, refresh disabled scenario.
///
/// Assertions:
/// - Ensures every persisted credential is cleared.
/// - Ensures the session ends unauthenticated without network calls.
#[tokio::test]
async fn boot_clears_expired_tokens_when_refresh_disabled() {
    let tab = TestTab::new(create_test_config().with_refresh(false), APP_URL);
    seed_tokens(&tab, &create_test_tokens("stale", NOW - 10));
    tab.storage.insert(USER_KEY, r#"{"sub":"user-1"}"#);

    tab.session.boot().await;

    assert_eq!(tab.session.state(), SessionState::unauthenticated());
    assert!(tab.storage.is_empty());
    assert_eq!(tab.oidc.total_calls(), 0);
}

#[tokio::test]
async fn boot_restores_valid_session_with_cached_profile() {
    let tab = TestTab::new(create_test_config(), APP_URL);
    let tokens = create_test_tokens("still-good", NOW + 3_600);
    seed_tokens(&tab, &tokens);
    tab.storage.insert(USER_KEY, r#"{"sub":"user-1"}"#);

    tab.session.boot().await;

    let state = tab.session.state();
    assert!(state.is_authenticated);
    assert_eq!(state.tokens, Some(tokens));
    assert_eq!(state.user.unwrap()["sub"], "user-1");
    assert_eq!(tab.oidc.total_calls(), 0);
}

#[tokio::test]
async fn boot_treats_malformed_tokens_as_absent() {
    let tab = TestTab::new(create_test_config(), APP_URL);
    tab.storage.insert(TOKENS_KEY, "{broken");

    tab.session.boot().await;

    assert_eq!(tab.session.state(), SessionState::unauthenticated());
}

/// Validates boot behavior for the refresh-due scenario.
///
/// Assertions:
/// - Confirms the refresh endpoint is called exactly once with the stored refresh token.
/// - Confirms the new tokens are persisted and published.
/// - Confirms the lock entry is released.
#[tokio::test]
async fn boot_refreshes_due_tokens_when_lock_is_free() {
    let config = create_test_config();
    let lock_key = config.refresh_lock_key.clone();
    let tab = TestTab::new(config, APP_URL);
    seed_tokens(&tab, &create_test_tokens("old", NOW + 30));
    let refreshed = TokenSet::new("new", NOW + 3_600).with_refresh_token("rt-2");
    tab.oidc.script_refresh(Ok(refreshed.clone()));

    tab.session.boot().await;

    assert_eq!(tab.oidc.refresh_calls(), vec!["rt-1".to_string()]);
    let state = tab.session.state();
    assert!(state.is_authenticated);
    assert_eq!(state.tokens, Some(refreshed.clone()));
    let persisted: TokenSet = serde_json::from_str(&tab.storage.value(TOKENS_KEY).unwrap()).unwrap();
    assert_eq!(persisted, refreshed);
    assert!(tab.storage.value(&lock_key).is_none());
}

/// Validates boot behavior at the refresh leeway boundary.
///
/// Assertions:
/// - Ensures `expires_at - leeway == now` triggers a refresh.
/// - Ensures one second later than that does not.
#[tokio::test]
async fn refresh_boundary_is_inclusive() {
    let due = TestTab::new(create_test_config(), APP_URL);
    seed_tokens(&due, &create_test_tokens("edge", NOW + 90));
    due.oidc.script_refresh(Ok(TokenSet::new("new", NOW + 3_600)));
    due.session.boot().await;
    assert_eq!(due.oidc.refresh_calls().len(), 1);

    let not_due = TestTab::new(create_test_config(), APP_URL);
    seed_tokens(&not_due, &create_test_tokens("edge", NOW + 91));
    not_due.session.boot().await;
    assert!(not_due.oidc.refresh_calls().is_empty());
    assert_eq!(not_due.session.state().access_token(), Some("edge"));
}

#[tokio::test]
async fn boot_refresh_failure_clears_session() {
    let config = create_test_config();
    let lock_key = config.refresh_lock_key.clone();
    let tab = TestTab::new(config, APP_URL);
    seed_tokens(&tab, &create_test_tokens("old", NOW + 30));
    tab.oidc.script_refresh(Err(AuthError::http_status(400, "Refresh")));

    tab.session.boot().await;

    let state = tab.session.state();
    assert!(!state.is_authenticated);
    assert_eq!(state.error.as_deref(), Some("Refresh failed (400)"));
    assert!(tab.storage.value(TOKENS_KEY).is_none());
    assert!(tab.storage.value(&lock_key).is_none());
}

/// Validates that boot runs once even when awaited concurrently.
///
/// Assertions:
/// - Confirms a callback is exchanged exactly once across concurrent and repeated boots.
#[tokio::test]
async fn boot_runs_exactly_once() {
    let tab = Arc::new(TestTab::new(create_test_config(), CALLBACK_URL));
    seed_pending_authorization(&tab, "xyz");

    tokio::join!(tab.session.boot(), tab.session.boot());
    tab.session.boot().await;

    assert_eq!(tab.oidc.exchange_calls().len(), 1);
    assert!(tab.session.state().is_authenticated);
}
