//! Token, PKCE and session state types
//!
//! `TokenSet` and `SessionState` serialize in camelCase so the persisted
//! layout matches what browser-side clients of the same origin write.

use serde::{Deserialize, Serialize};

/// Opaque user profile returned by the userinfo endpoint
pub type UserProfile = serde_json::Map<String, serde_json::Value>;

/// OAuth 2.0 / OpenID Connect token set
///
/// `expires_at` is an absolute UNIX timestamp (seconds) computed when the
/// token response was received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    pub access_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Optional because some providers don't issue refresh tokens to SPAs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    pub expires_at: i64,
}

impl TokenSet {
    /// Create a token set holding only an access token
    #[must_use]
    pub fn new(access_token: impl Into<String>, expires_at: i64) -> Self {
        Self {
            access_token: access_token.into(),
            id_token: None,
            refresh_token: None,
            token_type: None,
            scope: None,
            expires_at,
        }
    }

    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    #[must_use]
    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }

    /// Whether the access token should be renewed: `expires_at - leeway <= now`
    ///
    /// The boundary is inclusive, so a token exactly `leeway` seconds from
    /// expiry is due.
    #[must_use]
    pub const fn is_due_for_refresh(&self, now_secs: i64, leeway_secs: i64) -> bool {
        self.expires_at.saturating_sub(leeway_secs) <= now_secs
    }

    /// Whether the access token is expired once clock skew is accounted for
    #[must_use]
    pub const fn is_expired(&self, now_secs: i64, skew_secs: i64) -> bool {
        self.expires_at.saturating_sub(skew_secs) <= now_secs
    }

    /// Whether a refresh token is available
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Seconds until expiry (negative once expired)
    #[must_use]
    pub const fn seconds_until_expiry(&self, now_secs: i64) -> i64 {
        self.expires_at.saturating_sub(now_secs)
    }
}

/// PKCE artifacts for one authorization request
///
/// Created at login, persisted before navigating away, consumed once when the
/// callback is completed.
#[derive(Clone, PartialEq, Eq)]
pub struct PkceChallenge {
    /// High-entropy secret, sent only with the token exchange
    pub verifier: String,
    /// BASE64URL(SHA256(verifier)), sent with the authorize request
    pub challenge: String,
    pub state: String,
    pub nonce: String,
}

impl std::fmt::Debug for PkceChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkceChallenge")
            .field("verifier", &"<redacted>")
            .field("challenge", &self.challenge)
            .field("state", &self.state)
            .field("nonce", &self.nonce)
            .finish()
    }
}

/// Authorize URL plus the artifacts the caller must persist before navigating
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub url: String,
    pub pkce: PkceChallenge,
}

/// PKCE artifacts read back from storage at callback time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingAuthorization {
    pub verifier: Option<String>,
    pub state: Option<String>,
    pub nonce: Option<String>,
}

/// Session state published to the UI layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub is_loading: bool,
    pub is_authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionState {
    /// Initial state, before boot completes
    #[must_use]
    pub const fn loading() -> Self {
        Self { is_loading: true, is_authenticated: false, user: None, tokens: None, error: None }
    }

    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self { is_loading: false, is_authenticated: false, user: None, tokens: None, error: None }
    }

    /// Unauthenticated state carrying the message of the failure that caused it
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self { error: Some(error.into()), ..Self::unauthenticated() }
    }

    #[must_use]
    pub const fn authenticated(tokens: TokenSet, user: Option<UserProfile>) -> Self {
        Self { is_loading: false, is_authenticated: true, user, tokens: Some(tokens), error: None }
    }

    /// Current access token, if authenticated
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.access_token.as_str())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::loading()
    }
}
