//! # TabAuth Infrastructure
//!
//! Adapters for the ports defined in `tabauth-core`.
//!
//! This crate contains:
//! - Storage backends (memory, durable file, session-scoped file)
//! - The reqwest-based OIDC wire client
//! - A navigator driven by the embedding host
//! - Bearer-authenticated HTTP requests on behalf of a session
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `tabauth-core`
//! - Contains all "impure" code (HTTP, filesystem, environment)

pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod http;
pub mod navigation;
pub mod observability;
pub mod oidc;
pub mod storage;

// Re-export commonly used items
pub use bootstrap::{create_session, create_session_with};
pub use errors::InfraError;
pub use http::{AuthorizedClient, HttpClient, HttpClientBuilder};
pub use navigation::{HostNavigator, NavigationEvent};
pub use observability::{init_tracing, LogFormat};
pub use oidc::ReqwestOidcClient;
pub use storage::{
    new_scope_id, resolve_storage, FileStorage, MemoryStorage, ScopedStorage, StorageOptions, DEFAULT_SCOPE_ID,
};
