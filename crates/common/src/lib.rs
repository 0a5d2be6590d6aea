//! Leaf utilities shared across TabAuth crates.
//!
//! # Feature Tiers
//!
//! The wall-clock abstraction in [`time`] is always available. Enable cargo
//! features to opt into the rest:
//! - `foundation`: crypto primitives (secure random strings, PKCE)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod time;

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod crypto;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use crypto::pkce::{derive_challenge, generate_random_string, validate_state};
pub use time::{Clock, MockClock, SystemClock};
