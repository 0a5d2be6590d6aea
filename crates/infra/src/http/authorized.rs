//! Bearer-authenticated requests on behalf of a session

use std::sync::Arc;

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use tabauth_core::SessionOrchestrator;
use tabauth_domain::{AuthError, Result};
use tracing::{debug, warn};

use super::client::HttpClient;
use crate::errors::into_auth;

/// Attaches the session's current access token to outgoing requests
///
/// The token is fetched per request through
/// [`SessionOrchestrator::get_access_token`], so a due token is refreshed
/// (or adopted from another session) first. Without a token the request goes
/// out unauthenticated. A 401 is logged and handed back; it does not log the
/// session out.
#[derive(Clone)]
pub struct AuthorizedClient {
    http: HttpClient,
    session: Arc<SessionOrchestrator>,
}

impl AuthorizedClient {
    pub fn new(http: HttpClient, session: Arc<SessionOrchestrator>) -> Self {
        Self { http, session }
    }

    pub fn session(&self) -> &Arc<SessionOrchestrator> {
        &self.session
    }

    pub fn get<U: reqwest::IntoUrl>(&self, url: U) -> RequestBuilder {
        self.http.request(Method::GET, url)
    }

    pub fn post<U: reqwest::IntoUrl>(&self, url: U) -> RequestBuilder {
        self.http.request(Method::POST, url)
    }

    pub fn request<U: reqwest::IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Send `builder` with `Authorization` and `Accept` filled in
    ///
    /// # Errors
    /// Propagates refresh failures from the session and transport failures.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let token = self.session.get_access_token().await?;
        let mut request = builder.build().map_err(into_auth)?;

        let headers = request.headers_mut();
        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        match token {
            Some(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                    AuthError::InvalidResponse("access token is not a valid header value".into())
                })?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            None => debug!(url = %request.url().path(), "http.unauthenticated_request"),
        }

        let path = request.url().path().to_string();
        let response = self.http.execute(request).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(url = %path, "http.unauthorized");
        }
        Ok(response)
    }
}
