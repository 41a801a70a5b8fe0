//! Configuration structures for the pipeline.
//!
//! Populated by `finsync-infra`'s loader from environment variables or a
//! config file; see that crate for the loading strategy.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CHUNK_SIZE;

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub source: StoreConfig,
    pub target: StoreConfig,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// Connection settings for one relational store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database location understood by the driver
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Identity and upsert endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Identity endpoint issuing bearer tokens
    pub auth_url: String,
    /// Financial upsert endpoint
    pub upsert_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Fixed secondary header token required by the identity endpoint
    pub gateway_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Extraction tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Rows fetched per store round trip
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
    /// Default insertion-date window when no explicit contracts are given
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { chunk_size: default_chunk_size(), window_days: default_window_days() }
    }
}

fn default_pool_size() -> u32 {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_chunk_size() -> u32 {
    DEFAULT_CHUNK_SIZE
}

fn default_window_days() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_defaults_apply_when_section_missing() {
        let json = r#"{
            "source": { "path": "source.db" },
            "target": { "path": "target.db" },
            "gateway": {
                "auth_url": "https://gateway.example.com/authenticate",
                "upsert_url": "https://gateway.example.com/upsert",
                "client_id": "id",
                "client_secret": "secret",
                "gateway_token": "xtoken"
            }
        }"#;

        let config: Config = serde_json::from_str(json).expect("config should parse");
        assert_eq!(config.extraction.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.extraction.window_days, 1);
        assert_eq!(config.source.pool_size, 4);
        assert_eq!(config.gateway.timeout_secs, 30);
    }
}
