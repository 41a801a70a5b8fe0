//! Credential cache for the gateway's identity endpoint.
//!
//! Tokens come from a `client_credentials` grant posted as a form, with the
//! fixed gateway token in an `X-Token` header. A cached token is reused
//! until it is within the expiry margin of lapsing; renewal is serialized
//! behind one async mutex so concurrent callers never race a double grant.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use finsync_domain::constants::{DEFAULT_TOKEN_TTL_SECS, TOKEN_EXPIRY_MARGIN_SECS};
use finsync_core::AccessTokenProvider;
use finsync_domain::{GatewayConfig, Result, SyncError};
use reqwest::Method;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::http::HttpClient;

/// Caching token source for gateway calls.
pub struct CredentialCache {
    http: HttpClient,
    auth_url: String,
    client_id: String,
    client_secret: String,
    gateway_token: String,
    cached: Mutex<Option<TokenSet>>,
}

#[derive(Clone)]
struct TokenSet {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl TokenSet {
    fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) > now
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

impl CredentialCache {
    pub fn new(config: &GatewayConfig, http: HttpClient) -> Self {
        Self {
            http,
            auth_url: config.auth_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            gateway_token: config.gateway_token.clone(),
            cached: Mutex::new(None),
        }
    }

    /// Drop the cached token so the next call performs a fresh grant.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn renew(&self) -> Result<TokenSet> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let request = self
            .http
            .request(Method::POST, &self.auth_url)
            .header("X-Token", &self.gateway_token)
            .form(&form);

        let response = self
            .http
            .send(request)
            .await
            .map_err(|err| SyncError::Auth(format!("identity endpoint unreachable: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Auth(format!("identity endpoint returned {status}")));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|err| SyncError::Auth(format!("malformed token response: {err}")))?;

        let ttl = body.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        let token = TokenSet {
            access_token: body.access_token,
            expires_at: Utc::now() + Duration::seconds(ttl),
        };

        info!(expires_at = %token.expires_at, "gateway token renewed");
        Ok(token)
    }
}

#[async_trait]
impl AccessTokenProvider for CredentialCache {
    async fn access_token(&self) -> Result<String> {
        // Held across renewal: a second caller waits instead of racing a
        // second grant.
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_usable(Utc::now()) {
                debug!("reusing cached gateway token");
                return Ok(token.access_token.clone());
            }
        }

        let token = self.renew().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}
