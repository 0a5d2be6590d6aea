//! Application constants
//!
//! Storage keys and defaults shared by every layer. Storage keys are part of
//! the persisted format: every tab sharing one storage origin must agree on
//! them.

// Storage keys
pub const TOKENS_KEY: &str = "tabauth_tokens";
pub const USER_KEY: &str = "tabauth_user";
pub const PKCE_VERIFIER_KEY: &str = "tabauth_pkce_verifier";
pub const STATE_KEY: &str = "tabauth_state";
pub const NONCE_KEY: &str = "tabauth_nonce";

// Configuration defaults
pub const DEFAULT_SCOPES: [&str; 3] = ["openid", "profile", "email"];
pub const DEFAULT_ENDPOINT_PREFIX: &str = "/oidc";
pub const DEFAULT_CLOCK_SKEW_SECONDS: i64 = 60;
pub const DEFAULT_REFRESH_LEEWAY_SECONDS: i64 = 90;
pub const DEFAULT_REFRESH_LOCK_KEY: &str = "tabauth_refresh_lock";
pub const DEFAULT_REFRESH_LOCK_TTL_MS: u64 = 15_000;
pub const DEFAULT_REFRESH_WAIT_TIMEOUT_MS: u64 = 6_000;

// Token lifetime used when the provider omits `expires_in`
pub const DEFAULT_EXPIRES_IN_SECONDS: i64 = 3_600;

// PKCE artifact sizes (random bytes before encoding)
pub const VERIFIER_BYTES: usize = 32;
pub const STATE_BYTES: usize = 16;
pub const NONCE_BYTES: usize = 16;

// Refresh lock polling
pub const LOCK_POLL_INTERVAL_MS: u64 = 150;

// Wire constants
pub const CODE_CHALLENGE_METHOD: &str = "S256";
pub const POST_LOGOUT_REDIRECT_PARAM: &str = "post_logout_redirect_uri";
