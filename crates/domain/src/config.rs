//! Authentication configuration
//!
//! `AuthConfig` is owned by the embedding application and read-only to the
//! rest of the stack. Every field except `issuer`, `client_id` and
//! `redirect_uri` has a default, so a minimal JSON/TOML document is enough.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::constants::{
    DEFAULT_CLOCK_SKEW_SECONDS, DEFAULT_ENDPOINT_PREFIX, DEFAULT_REFRESH_LEEWAY_SECONDS,
    DEFAULT_REFRESH_LOCK_KEY, DEFAULT_REFRESH_LOCK_TTL_MS, DEFAULT_REFRESH_WAIT_TIMEOUT_MS,
    DEFAULT_SCOPES,
};
use crate::errors::{AuthError, Result};
use crate::impl_selector_conversions;

/// Storage backend selector
///
/// - `Durable` survives process restart (browser `localStorage` semantics)
/// - `Session` survives reload, cleared when the browsing session ends
/// - `Memory` is cleared on reload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    Durable,
    #[default]
    Session,
    Memory,
}

impl_selector_conversions!(StorageKind {
    Durable => "durable" | "local",
    Session => "session",
    Memory => "memory",
});

impl Serialize for StorageKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StorageKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// OpenID Connect client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Issuer base URL, e.g. `https://idp.example.com/t123`
    pub issuer: String,

    /// Explicit endpoint overrides; defaults derive from the issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorize_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,
    /// End-session endpoint; no default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_session_endpoint: Option<String>,

    /// Path segment appended to the issuer for default endpoints
    /// (`/oidc` or `/oauth2` depending on the provider)
    #[serde(default = "default_endpoint_prefix")]
    pub endpoint_prefix: String,

    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_logout_redirect_uri: Option<String>,

    /// Requested scopes; empty means the default `openid profile email`
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    /// Merged into the authorize URL last; may override earlier parameters
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_authorize_params: BTreeMap<String, String>,

    #[serde(default = "default_true")]
    pub use_refresh_token: bool,
    /// App route to resume after login when the caller gives none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_app_redirect: Option<String>,

    #[serde(default)]
    pub storage: StorageKind,
    /// Root directory for file-backed storage backends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,

    #[serde(default = "default_clock_skew")]
    pub clock_skew_seconds: i64,
    #[serde(default = "default_refresh_leeway")]
    pub refresh_leeway_seconds: i64,
    #[serde(default = "default_lock_key")]
    pub refresh_lock_key: String,
    #[serde(default = "default_lock_ttl")]
    pub refresh_lock_ttl_ms: u64,
    #[serde(default = "default_wait_timeout")]
    pub refresh_wait_timeout_ms: u64,
}

fn default_endpoint_prefix() -> String {
    DEFAULT_ENDPOINT_PREFIX.to_string()
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(ToString::to_string).collect()
}

const fn default_true() -> bool {
    true
}

const fn default_clock_skew() -> i64 {
    DEFAULT_CLOCK_SKEW_SECONDS
}

const fn default_refresh_leeway() -> i64 {
    DEFAULT_REFRESH_LEEWAY_SECONDS
}

fn default_lock_key() -> String {
    DEFAULT_REFRESH_LOCK_KEY.to_string()
}

const fn default_lock_ttl() -> u64 {
    DEFAULT_REFRESH_LOCK_TTL_MS
}

const fn default_wait_timeout() -> u64 {
    DEFAULT_REFRESH_WAIT_TIMEOUT_MS
}

impl AuthConfig {
    /// Create a configuration with defaults for every optional field
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            authorize_endpoint: None,
            token_endpoint: None,
            userinfo_endpoint: None,
            end_session_endpoint: None,
            endpoint_prefix: default_endpoint_prefix(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            post_logout_redirect_uri: None,
            scopes: default_scopes(),
            audience: None,
            extra_authorize_params: BTreeMap::new(),
            use_refresh_token: true,
            default_app_redirect: None,
            storage: StorageKind::default(),
            storage_dir: None,
            clock_skew_seconds: DEFAULT_CLOCK_SKEW_SECONDS,
            refresh_leeway_seconds: DEFAULT_REFRESH_LEEWAY_SECONDS,
            refresh_lock_key: default_lock_key(),
            refresh_lock_ttl_ms: DEFAULT_REFRESH_LOCK_TTL_MS,
            refresh_wait_timeout_ms: DEFAULT_REFRESH_WAIT_TIMEOUT_MS,
        }
    }

    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    #[must_use]
    pub fn with_extra_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_authorize_params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_end_session(
        mut self,
        endpoint: Option<String>,
        post_logout_redirect_uri: Option<String>,
    ) -> Self {
        self.end_session_endpoint = endpoint;
        self.post_logout_redirect_uri = post_logout_redirect_uri;
        self
    }

    #[must_use]
    pub const fn with_refresh(mut self, enabled: bool) -> Self {
        self.use_refresh_token = enabled;
        self
    }

    #[must_use]
    pub const fn with_storage(mut self, storage: StorageKind) -> Self {
        self.storage = storage;
        self
    }

    #[must_use]
    pub fn with_lock(mut self, key: impl Into<String>, ttl_ms: u64, wait_timeout_ms: u64) -> Self {
        self.refresh_lock_key = key.into();
        self.refresh_lock_ttl_ms = ttl_ms;
        self.refresh_wait_timeout_ms = wait_timeout_ms;
        self
    }

    /// Space-separated scope string, falling back to the default set
    #[must_use]
    pub fn scope_string(&self) -> String {
        if self.scopes.is_empty() {
            DEFAULT_SCOPES.join(" ")
        } else {
            self.scopes.join(" ")
        }
    }

    /// Check that URLs are absolute http(s) and required fields are present
    ///
    /// # Errors
    /// Returns `AuthError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate_url("issuer", &self.issuer)?;
        for (field, value) in [
            ("authorize_endpoint", &self.authorize_endpoint),
            ("token_endpoint", &self.token_endpoint),
            ("userinfo_endpoint", &self.userinfo_endpoint),
            ("end_session_endpoint", &self.end_session_endpoint),
        ] {
            if let Some(url) = value {
                validate_url(field, url)?;
            }
        }

        if self.client_id.trim().is_empty() {
            return Err(AuthError::Config("client_id must not be empty".to_string()));
        }
        if self.redirect_uri.trim().is_empty() {
            return Err(AuthError::Config("redirect_uri must not be empty".to_string()));
        }
        if self.refresh_lock_key.is_empty() {
            return Err(AuthError::Config("refresh_lock_key must not be empty".to_string()));
        }
        if self.refresh_lock_ttl_ms == 0 {
            return Err(AuthError::Config("refresh_lock_ttl_ms must be positive".to_string()));
        }
        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    let parsed = Url::parse(value)
        .map_err(|e| AuthError::Config(format!("{field} is not a valid URL ({value}): {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AuthError::Config(format!("{field} must use http or https, got {other}"))),
    }
}
