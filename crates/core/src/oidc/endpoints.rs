//! Endpoint resolution from the issuer and explicit overrides

use tabauth_domain::constants::POST_LOGOUT_REDIRECT_PARAM;
use tabauth_domain::{AuthConfig, AuthError, Result};
use url::Url;

/// Resolved endpoint URLs for one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub authorize: String,
    pub token: String,
    pub userinfo: String,
    /// Only present when configured; there is no default
    pub end_session: Option<String>,
}

/// Derive endpoint URLs, preferring explicit overrides
///
/// Defaults are `<issuer><prefix>/authorize`, `/token` and `/userinfo`, with
/// trailing slashes stripped from the issuer.
pub fn resolve_endpoints(config: &AuthConfig) -> Endpoints {
    let base = config.issuer.trim_end_matches('/');
    let prefix = config.endpoint_prefix.trim_matches('/');
    let default = |leaf: &str| {
        if prefix.is_empty() {
            format!("{base}/{leaf}")
        } else {
            format!("{base}/{prefix}/{leaf}")
        }
    };

    Endpoints {
        authorize: config.authorize_endpoint.clone().unwrap_or_else(|| default("authorize")),
        token: config.token_endpoint.clone().unwrap_or_else(|| default("token")),
        userinfo: config.userinfo_endpoint.clone().unwrap_or_else(|| default("userinfo")),
        end_session: config.end_session_endpoint.clone(),
    }
}

/// Where to send the browser after local logout
///
/// The end-session endpoint (with the post-logout redirect appended) when
/// configured, else the post-logout redirect itself, else nowhere.
///
/// # Errors
/// Returns `AuthError::Config` if the end-session endpoint is not a valid URL
pub fn logout_url(config: &AuthConfig) -> Result<Option<String>> {
    match (&config.end_session_endpoint, &config.post_logout_redirect_uri) {
        (Some(endpoint), post_logout) => {
            let mut url = Url::parse(endpoint).map_err(|e| {
                AuthError::Config(format!("end_session_endpoint is not a valid URL: {e}"))
            })?;
            if let Some(target) = post_logout {
                url.query_pairs_mut().append_pair(POST_LOGOUT_REDIRECT_PARAM, target);
            }
            Ok(Some(url.to_string()))
        }
        (None, Some(target)) => Ok(Some(target.clone())),
        (None, None) => Ok(None),
    }
}
