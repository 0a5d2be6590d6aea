//! OpenID Connect request building and response shaping
//!
//! Everything here is transport-free: the authorize URL is assembled from
//! configuration and fresh PKCE artifacts, and token responses are turned into
//! [`TokenSet`](tabauth_domain::TokenSet)s. The HTTP calls themselves sit
//! behind [`OidcClient`](crate::ports::OidcClient).

pub mod authorize;
pub mod endpoints;
pub mod id_token;
pub mod token;

pub use authorize::build_authorization_request;
pub use endpoints::{logout_url, resolve_endpoints, Endpoints};
pub use id_token::nonce_claim;
pub use token::{OAuthErrorBody, TokenResponse};
