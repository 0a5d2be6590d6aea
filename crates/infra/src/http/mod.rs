//! HTTP plumbing: the shared reqwest wrapper and the bearer-token client

mod authorized;
mod client;

pub use authorized::AuthorizedClient;
pub use client::{HttpClient, HttpClientBuilder};
