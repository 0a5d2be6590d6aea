//! Port interfaces for the session core
//!
//! These traits define the boundaries between the session logic and the
//! host environment: where values are stored, how the location changes, and
//! how the authorization server is reached.

use async_trait::async_trait;
use tabauth_domain::{Result, TokenSet, UserProfile};

/// String key/value storage shared by every session of one origin
///
/// No implementation is required to be transactional. Writes from other
/// sessions may interleave between any two calls.
pub trait KeyValueStorage: Send + Sync {
    /// Read a value; absence is `Ok(None)`
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing a missing key succeeds
    fn remove(&self, key: &str) -> Result<()>;
}

/// Location of the hosting page
pub trait Navigator: Send + Sync {
    /// Full current URL, including query
    fn current_url(&self) -> String;

    /// Full navigation away from the current page
    fn assign(&self, url: &str) -> Result<()>;

    /// Replace the current location in place, without adding a history entry
    fn replace(&self, url: &str) -> Result<()>;
}

/// Wire calls against the authorization server's token and userinfo endpoints
#[async_trait]
pub trait OidcClient: Send + Sync {
    /// Exchange an authorization code plus PKCE verifier for tokens
    async fn exchange_code(&self, code: &str, verifier: &str) -> Result<TokenSet>;

    /// Redeem a refresh token; the returned set carries the prior refresh
    /// token forward when the server does not rotate it
    async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenSet>;

    /// Fetch the user profile with a bearer access token
    async fn fetch_user_info(&self, access_token: &str) -> Result<UserProfile>;
}
