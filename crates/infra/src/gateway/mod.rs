//! Target-system gateway: credential management and financial upserts.

pub mod auth;
pub mod client;

pub use auth::CredentialCache;
pub use client::GatewayClient;
