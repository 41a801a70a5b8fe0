use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with built-in retry and timeout support.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// Server errors (5xx) and transport-level failures are retried with
    /// exponential backoff; any other response is returned as-is, status
    /// handling is the caller's concern.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, InfraError> {
        let attempts = self.max_attempts.max(1);

        for attempt in 0..attempts.saturating_sub(1) {
            let Some(cloned_builder) = builder.try_clone() else {
                // Streaming bodies cannot be replayed; send once, win or lose.
                return self.execute_attempt(builder, 1).await;
            };

            match self.execute_attempt(cloned_builder, attempt + 1).await {
                Ok(response) if response.status().is_server_error() => {
                    self.sleep_with_backoff(attempt + 1).await;
                }
                Ok(response) => return Ok(response),
                Err(InfraError::Http(err)) if should_retry_error(&err) => {
                    self.sleep_with_backoff(attempt + 1).await;
                }
                Err(err) => return Err(err),
            }
        }

        self.execute_attempt(builder, attempts).await
    }

    async fn execute_attempt(
        &self,
        builder: RequestBuilder,
        attempt: usize,
    ) -> Result<Response, InfraError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(attempt, %method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(attempt, %method, %url, %status, "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(attempt, %method, %url, error = %err, "HTTP request failed");
                Err(err.into())
            }
        }
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, InfraError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build()?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_request() || err.is_connect()
}
