use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, Request, RequestBuilder, Response};
use tabauth_domain::Result;
use tracing::debug;

use crate::errors::into_auth;

const DEFAULT_USER_AGENT: &str = concat!("tabauth/", env!("CARGO_PKG_VERSION"));

/// Thin reqwest wrapper with a request timeout and a fixed user agent
///
/// Every request is sent exactly once. Authorization codes and rotated
/// refresh tokens are single-use, so a repeated POST could burn a grant.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Build and execute `builder`
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build().map_err(into_auth)?;
        self.execute(request).await
    }

    /// Execute a prepared request; any HTTP status is returned as a response
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let method = request.method().clone();
        let path = request.url().path().to_string();

        debug!(%method, url = %path, "http.request.sending");
        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, url = %path, status = %response.status(), "http.request.completed");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, url = %path, error = %err, "http.request.failed");
                Err(into_auth(err))
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: String,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder =
            ReqwestClient::builder().timeout(self.timeout).user_agent(self.user_agent).no_proxy();

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(into_auth)?;

        Ok(HttpClient { client })
    }
}
