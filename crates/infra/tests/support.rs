#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tabauth_common::time::{Clock, SystemClock};
use tabauth_core::SessionOrchestrator;
use tabauth_domain::AuthConfig;
use tabauth_infra::{FileStorage, HostNavigator, NavigationEvent, ReqwestOidcClient};
use tokio::sync::mpsc::UnboundedReceiver;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const APP_URL: &str = "https://app.example.com/dashboard";
pub const REDIRECT_URI: &str = "https://app.example.com/callback";

/// Configuration whose issuer is the mock server, default `/oidc` endpoints
pub fn config_for(server: &MockServer) -> AuthConfig {
    AuthConfig::new(server.uri(), "spa-client", REDIRECT_URI)
}

pub fn token_body(access_token: &str, refresh_token: Option<&str>, expires_in: i64) -> Value {
    let mut body = json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in
    });
    if let Some(refresh) = refresh_token {
        body["refresh_token"] = json!(refresh);
    }
    body
}

pub async fn mount_userinfo(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/oidc/userinfo"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "sub": "user-1", "name": "Test User" })),
        )
        .mount(server)
        .await;
}

pub fn unix_now() -> i64 {
    SystemClock::new().now_secs()
}

pub fn query_of(url: &str) -> HashMap<String, String> {
    Url::parse(url).unwrap().query_pairs().into_owned().collect()
}

/// One "tab": a session over the durable file at `storage_path`, loaded at
/// `location`
pub struct FileTab {
    pub session: Arc<SessionOrchestrator>,
    pub navigator: Arc<HostNavigator>,
    pub events: UnboundedReceiver<NavigationEvent>,
}

impl FileTab {
    pub fn open(config: AuthConfig, storage_path: &Path, location: &str) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let storage = Arc::new(FileStorage::open(storage_path).unwrap());
        let oidc = Arc::new(ReqwestOidcClient::new(config.clone(), clock.clone()).unwrap());
        let (navigator, events) = HostNavigator::new(location);
        let navigator = Arc::new(navigator);
        let session =
            Arc::new(SessionOrchestrator::new(config, storage, oidc, navigator.clone(), clock));
        Self { session, navigator, events }
    }

    pub fn drain_events(&mut self) -> Vec<NavigationEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
