//! Authorization request construction

use tabauth_common::crypto::generate_pkce_challenge;
use tabauth_domain::constants::CODE_CHALLENGE_METHOD;
use tabauth_domain::{AuthConfig, AuthError, AuthorizationRequest, Result};
use url::Url;

use super::endpoints::resolve_endpoints;

/// Build the authorize URL with a fresh PKCE challenge, state and nonce
///
/// Required parameters come first, then `audience` and `app_state` when
/// present, then the configured extra parameters, which may override any
/// earlier key. The caller must persist the returned artifacts before
/// navigating.
///
/// # Arguments
/// * `config` - Provider and client configuration
/// * `app_state` - Opaque value echoed back by the provider, typically the
///   in-app path to resume at
///
/// # Errors
/// Returns `AuthError::Config` if the authorize endpoint is not a valid URL,
/// or `AuthError::Internal` if the random source fails
pub fn build_authorization_request(
    config: &AuthConfig,
    app_state: Option<&str>,
) -> Result<AuthorizationRequest> {
    let endpoint = resolve_endpoints(config).authorize;
    let mut url = Url::parse(&endpoint)
        .map_err(|e| AuthError::Config(format!("authorize endpoint is not a valid URL: {e}")))?;

    let pkce = generate_pkce_challenge()?;

    let mut params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let mut set = |key: &str, value: &str| set_param(&mut params, key, value);

    set("response_type", "code");
    set("client_id", &config.client_id);
    set("redirect_uri", &config.redirect_uri);
    set("scope", &config.scope_string());
    set("code_challenge", &pkce.challenge);
    set("code_challenge_method", CODE_CHALLENGE_METHOD);
    set("state", &pkce.state);
    set("nonce", &pkce.nonce);

    if let Some(audience) = config.audience.as_deref().filter(|a| !a.is_empty()) {
        set("audience", audience);
    }
    if let Some(app_state) = app_state.filter(|s| !s.is_empty()) {
        set("app_state", app_state);
    }
    for (key, value) in &config.extra_authorize_params {
        set(key, value);
    }

    url.query_pairs_mut().clear().extend_pairs(params.iter());

    Ok(AuthorizationRequest { url: url.to_string(), pkce })
}

/// Replace the first occurrence of `key` and drop the rest, or append
fn set_param(params: &mut Vec<(String, String)>, key: &str, value: &str) {
    match params.iter().position(|(k, _)| k == key) {
        Some(index) => {
            params[index].1 = value.to_string();
            let mut seen = 0usize;
            params.retain(|(k, _)| {
                if k == key {
                    seen += 1;
                    seen == 1
                } else {
                    true
                }
            });
        }
        None => params.push((key.to_string(), value.to_string())),
    }
}
