//! Shared test helpers for `tabauth-core` integration tests.
//!
//! Lightweight scripted mocks of the ports so session tests can focus on
//! behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod navigator;
pub mod oidc;
pub mod storage;

use std::sync::Arc;

use tabauth_common::time::MockClock;
use tabauth_core::SessionOrchestrator;
use tabauth_domain::{AuthConfig, TokenSet};

pub use navigator::RecordingNavigator;
pub use oidc::MockOidcClient;
pub use storage::SharedStorage;

/// Fixed "now" for every session test, in epoch seconds
pub const NOW: i64 = 1_700_000_000;

pub const APP_URL: &str = "https://app.example.com/";
pub const REDIRECT_URI: &str = "https://app.example.com/callback";

pub fn create_test_config() -> AuthConfig {
    AuthConfig::new("https://idp.example.com/t1", "spa-client", REDIRECT_URI)
}

pub fn create_test_tokens(access: &str, expires_at: i64) -> TokenSet {
    TokenSet::new(access, expires_at).with_refresh_token("rt-1")
}

/// One simulated tab: an orchestrator plus handles on its collaborators
pub struct TestTab {
    pub session: SessionOrchestrator,
    pub storage: SharedStorage,
    pub oidc: Arc<MockOidcClient>,
    pub navigator: Arc<RecordingNavigator>,
    pub clock: MockClock,
}

impl TestTab {
    pub fn new(config: AuthConfig, location: &str) -> Self {
        Self::with_parts(
            config,
            location,
            SharedStorage::default(),
            Arc::new(MockOidcClient::new()),
            MockClock::at_secs(NOW),
        )
    }

    /// Build a tab over existing storage, client and clock, as a second tab
    /// of the same origin would
    pub fn with_parts(
        config: AuthConfig,
        location: &str,
        storage: SharedStorage,
        oidc: Arc<MockOidcClient>,
        clock: MockClock,
    ) -> Self {
        let navigator = Arc::new(RecordingNavigator::new(location));
        let session = SessionOrchestrator::new(
            config,
            Arc::new(storage.clone()),
            oidc.clone(),
            navigator.clone(),
            Arc::new(clock.clone()),
        );
        Self { session, storage, oidc, navigator, clock }
    }
}
