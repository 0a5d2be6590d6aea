//! Navigator backed by a host-side event channel
//!
//! The embedding host (webview shell, CLI with a loopback redirect, test
//! harness) owns the real location. `HostNavigator` mirrors it and forwards
//! every navigation request as a [`NavigationEvent`].

use parking_lot::Mutex;
use tabauth_core::Navigator;
use tabauth_domain::{AuthError, Result};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// Full navigation; the current page is gone afterwards
    Assign(String),
    /// In-place location replacement without a history entry
    Replace(String),
}

pub struct HostNavigator {
    location: Mutex<String>,
    events: UnboundedSender<NavigationEvent>,
}

impl HostNavigator {
    /// Navigator starting at `initial_url` plus the receiving end the host
    /// drains
    pub fn new(initial_url: impl Into<String>) -> (Self, UnboundedReceiver<NavigationEvent>) {
        let (events, receiver) = unbounded_channel();
        (Self { location: Mutex::new(initial_url.into()), events }, receiver)
    }

    /// Record a location change made by the host itself
    pub fn set_location(&self, url: impl Into<String>) {
        *self.location.lock() = url.into();
    }

    fn navigate(&self, url: &str, event: NavigationEvent) -> Result<()> {
        Url::parse(url).map_err(|e| AuthError::Navigation(format!("invalid target URL: {e}")))?;
        self.events
            .send(event)
            .map_err(|_| AuthError::Navigation("navigation host is no longer listening".into()))?;
        *self.location.lock() = url.to_string();
        Ok(())
    }
}

impl Navigator for HostNavigator {
    fn current_url(&self) -> String {
        self.location.lock().clone()
    }

    fn assign(&self, url: &str) -> Result<()> {
        debug!("navigation.assign");
        self.navigate(url, NavigationEvent::Assign(url.to_string()))
    }

    fn replace(&self, url: &str) -> Result<()> {
        debug!("navigation.replace");
        self.navigate(url, NavigationEvent::Replace(url.to_string()))
    }
}
