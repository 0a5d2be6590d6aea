//! Authorization server adapters

mod client;

pub use client::ReqwestOidcClient;
