//! HTTP transport shared by the gateway modules.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
