//! # TabAuth Domain
//!
//! Data types shared by every TabAuth layer.
//!
//! This crate contains:
//! - Authentication configuration (`AuthConfig`, `StorageKind`)
//! - Token, PKCE and session state types
//! - The error taxonomy and `Result` alias
//! - Storage keys and default values
//!
//! ## Architecture
//! - No dependencies on other TabAuth crates
//! - No I/O: storage, HTTP and navigation live behind ports in `tabauth-core`

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
