//! reqwest implementation of the `OidcClient` port

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, Response};
use tabauth_common::time::Clock;
use tabauth_core::oidc::{resolve_endpoints, OAuthErrorBody, TokenResponse};
use tabauth_core::{Endpoints, OidcClient};
use tabauth_domain::{AuthConfig, AuthError, Result, TokenSet, UserProfile};
use tracing::{debug, info, warn};

use crate::errors::into_auth;
use crate::http::HttpClient;

const TOKEN_EXCHANGE: &str = "Token exchange";
const REFRESH: &str = "Refresh";
const USER_INFO: &str = "UserInfo";

/// Token and userinfo calls over HTTP
///
/// Token requests are form-encoded POSTs sent exactly once. Non-2xx answers
/// become `AuthError::HttpStatus` naming the operation; the provider's OAuth
/// error body is logged, never surfaced.
pub struct ReqwestOidcClient {
    config: AuthConfig,
    endpoints: Endpoints,
    http: HttpClient,
    clock: Arc<dyn Clock>,
}

impl ReqwestOidcClient {
    /// # Errors
    /// Returns `AuthError::Config` for an invalid configuration and
    /// `AuthError::Network` if the HTTP client cannot be built.
    pub fn new(config: AuthConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::with_http(config, HttpClient::new()?, clock)
    }

    /// Use a preconfigured [`HttpClient`] (timeouts, headers)
    ///
    /// # Errors
    /// Returns `AuthError::Config` for an invalid configuration.
    pub fn with_http(config: AuthConfig, http: HttpClient, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let endpoints = resolve_endpoints(&config);
        debug!(token = %endpoints.token, userinfo = %endpoints.userinfo, "oidc.endpoints_resolved");
        Ok(Self { config, endpoints, http, clock })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn post_token_form(&self, form: &[(&str, &str)], operation: &'static str) -> Result<TokenResponse> {
        let request = self
            .http
            .request(Method::POST, &self.endpoints.token)
            .header(ACCEPT, "application/json")
            .form(form);
        let response = self.http.send(request).await?;
        let response = check_status(response, operation).await?;
        response.json::<TokenResponse>().await.map_err(into_auth)
    }
}

#[async_trait]
impl OidcClient for ReqwestOidcClient {
    async fn exchange_code(&self, code: &str, verifier: &str) -> Result<TokenSet> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
            ("code_verifier", verifier),
        ];
        let tokens = self
            .post_token_form(&form, TOKEN_EXCHANGE)
            .await?
            .into_token_set(self.clock.now_secs(), None)?;
        info!(expires_at = tokens.expires_at, has_refresh = tokens.can_refresh(), "oidc.code_exchanged");
        Ok(tokens)
    }

    async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenSet> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("refresh_token", refresh_token),
        ];
        let response = self.post_token_form(&form, REFRESH).await?;
        let rotated = response.refresh_token.as_deref().is_some_and(|t| !t.is_empty());
        let tokens = response.into_token_set(self.clock.now_secs(), Some(refresh_token))?;
        info!(expires_at = tokens.expires_at, rotated, "oidc.tokens_refreshed");
        Ok(tokens)
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<UserProfile> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|_| AuthError::InvalidResponse("access token is not a valid header value".into()))?;
        bearer.set_sensitive(true);

        let request = self
            .http
            .request(Method::GET, &self.endpoints.userinfo)
            .header(AUTHORIZATION, bearer)
            .header(ACCEPT, "application/json");
        let response = self.http.send(request).await?;
        let response = check_status(response, USER_INFO).await?;
        response.json::<UserProfile>().await.map_err(into_auth)
    }
}

/// Pass 2xx responses through; anything else becomes `HttpStatus`
async fn check_status(response: Response, operation: &'static str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<OAuthErrorBody>(&body) {
        Ok(oauth) => warn!(
            operation,
            status = status.as_u16(),
            error = %oauth.error,
            error_description = oauth.error_description.as_deref().unwrap_or(""),
            "oidc.request_rejected"
        ),
        Err(_) => warn!(operation, status = status.as_u16(), "oidc.request_rejected"),
    }
    Err(AuthError::http_status(status.as_u16(), operation))
}
