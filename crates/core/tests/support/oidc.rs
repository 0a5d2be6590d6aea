//! Scripted `OidcClient` with call recording

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tabauth_core::ports::OidcClient;
use tabauth_domain::{AuthError, Result as DomainResult, TokenSet, UserProfile};

use super::NOW;

pub struct MockOidcClient {
    exchange_result: Mutex<DomainResult<TokenSet>>,
    refresh_result: Mutex<DomainResult<TokenSet>>,
    user: Mutex<UserProfile>,
    refresh_delay: Mutex<Duration>,
    exchange_calls: Mutex<Vec<(String, String)>>,
    refresh_calls: Mutex<Vec<String>>,
    userinfo_calls: Mutex<Vec<String>>,
}

impl MockOidcClient {
    /// Exchange yields a one hour token set; refresh fails until scripted
    pub fn new() -> Self {
        let mut user = UserProfile::new();
        user.insert("sub".into(), serde_json::json!("user-1"));
        user.insert("email".into(), serde_json::json!("user@example.com"));

        Self {
            exchange_result: Mutex::new(Ok(
                TokenSet::new("exchanged-access", NOW + 3_600).with_refresh_token("exchanged-refresh")
            )),
            refresh_result: Mutex::new(Err(AuthError::Internal("refresh not scripted".into()))),
            user: Mutex::new(user),
            refresh_delay: Mutex::new(Duration::ZERO),
            exchange_calls: Mutex::new(Vec::new()),
            refresh_calls: Mutex::new(Vec::new()),
            userinfo_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn script_exchange(&self, result: DomainResult<TokenSet>) {
        *self.exchange_result.lock().unwrap() = result;
    }

    pub fn script_refresh(&self, result: DomainResult<TokenSet>) {
        *self.refresh_result.lock().unwrap() = result;
    }

    /// Hold every refresh call open for `delay`, widening the race window
    pub fn set_refresh_delay(&self, delay: Duration) {
        *self.refresh_delay.lock().unwrap() = delay;
    }

    pub fn user(&self) -> UserProfile {
        self.user.lock().unwrap().clone()
    }

    pub fn exchange_calls(&self) -> Vec<(String, String)> {
        self.exchange_calls.lock().unwrap().clone()
    }

    pub fn refresh_calls(&self) -> Vec<String> {
        self.refresh_calls.lock().unwrap().clone()
    }

    pub fn userinfo_calls(&self) -> Vec<String> {
        self.userinfo_calls.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.exchange_calls().len() + self.refresh_calls().len() + self.userinfo_calls().len()
    }
}

#[async_trait]
impl OidcClient for MockOidcClient {
    async fn exchange_code(&self, code: &str, verifier: &str) -> DomainResult<TokenSet> {
        self.exchange_calls.lock().unwrap().push((code.to_string(), verifier.to_string()));
        self.exchange_result.lock().unwrap().clone()
    }

    async fn refresh_tokens(&self, refresh_token: &str) -> DomainResult<TokenSet> {
        self.refresh_calls.lock().unwrap().push(refresh_token.to_string());
        let delay = *self.refresh_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.refresh_result.lock().unwrap().clone()
    }

    async fn fetch_user_info(&self, access_token: &str) -> DomainResult<UserProfile> {
        self.userinfo_calls.lock().unwrap().push(access_token.to_string());
        Ok(self.user())
    }
}
