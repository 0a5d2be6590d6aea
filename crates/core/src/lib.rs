//! # TabAuth Core
//!
//! Session logic for an OpenID Connect Authorization Code + PKCE client.
//!
//! This crate contains:
//! - Port interfaces for storage, navigation and the token endpoint
//! - Token store and the cross-session refresh lock
//! - Authorization request building and token response shaping
//! - The session orchestrator state machine
//!
//! ## Architecture Principles
//! - Only depends on `tabauth-common` and `tabauth-domain`
//! - No HTTP, filesystem or platform code
//! - All external dependencies via traits

pub mod oidc;
pub mod ports;
pub mod refresh_lock;
pub mod session;
pub mod token_store;

#[cfg(test)]
pub(crate) mod test_support;

pub use oidc::{build_authorization_request, logout_url, resolve_endpoints, Endpoints};
pub use ports::{KeyValueStorage, Navigator, OidcClient};
pub use refresh_lock::RefreshCoordinator;
pub use session::SessionOrchestrator;
pub use token_store::TokenStore;
