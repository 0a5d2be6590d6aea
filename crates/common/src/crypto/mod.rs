//! Cryptographic primitives: secure random strings and PKCE challenges.
//!
//! Nothing here goes beyond one SHA-256 digest and the operating system's
//! CSPRNG.

pub mod pkce;

pub use pkce::{
    derive_challenge, generate_pkce_challenge, generate_random_string, validate_state,
};
