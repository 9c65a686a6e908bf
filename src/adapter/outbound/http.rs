//! Shared HTTP plumbing for outbound adapters.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::warn;

use crate::error::{Error, Result};

/// Shared HTTP client settings for outbound adapters.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_http_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Maximum number of attempts for transient failures.
    #[serde(default = "default_http_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// Backoff between retries in milliseconds.
    #[serde(default = "default_http_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Pause between sequential sub-source calls in milliseconds.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

const fn default_http_timeout_ms() -> u64 {
    10_000
}

const fn default_http_connect_timeout_ms() -> u64 {
    3_000
}

const fn default_http_retry_max_attempts() -> u32 {
    2
}

const fn default_http_retry_backoff_ms() -> u64 {
    500
}

const fn default_pacing_ms() -> u64 {
    500
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout_ms(),
            connect_timeout_ms: default_http_connect_timeout_ms(),
            retry_max_attempts: default_http_retry_max_attempts(),
            retry_backoff_ms: default_http_retry_backoff_ms(),
            pacing_ms: default_pacing_ms(),
        }
    }
}

/// User agent sent to public endpoints.
pub const USER_AGENT: &str = concat!("trendsmith/", env!("CARGO_PKG_VERSION"));

/// HTTP client with bounded timeouts, retry on transient failures and a
/// pacing delay for sequential sub-source calls.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
    retry_max_attempts: u32,
    retry_backoff: Duration,
    pacing: Duration,
}

impl HttpFetcher {
    #[must_use]
    pub fn from_settings(settings: &HttpSettings) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .connect_timeout(Duration::from_millis(settings.connect_timeout_ms))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                Client::new()
            });

        Self {
            http,
            retry_max_attempts: settings.retry_max_attempts.max(1),
            retry_backoff: Duration::from_millis(settings.retry_backoff_ms),
            pacing: Duration::from_millis(settings.pacing_ms),
        }
    }

    /// The underlying client.
    pub fn client(&self) -> &Client {
        &self.http
    }

    /// Sleep for the configured pacing delay.
    pub async fn pace(&self) {
        if !self.pacing.is_zero() {
            sleep(self.pacing).await;
        }
    }

    /// Send the request built by `make` and decode a JSON body.
    pub async fn send_json<T, F>(&self, make: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let bytes = self.send_bytes(make).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send the request built by `make` and return the raw body.
    ///
    /// Timeouts and connect failures are retried; HTTP error statuses are not.
    pub async fn send_bytes<F>(&self, make: F) -> Result<Vec<u8>>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = async {
                make(&self.http)
                    .send()
                    .await?
                    .error_for_status()
                    .map_err(|e| Error::Connection(e.to_string()))?
                    .bytes()
                    .await
                    .map_err(Error::from)
            }
            .await;

            match result {
                Ok(bytes) => return Ok(bytes.to_vec()),
                Err(Error::Http(err))
                    if attempt < self.retry_max_attempts && (err.is_timeout() || err.is_connect()) =>
                {
                    warn!(
                        attempt,
                        max_attempts = self.retry_max_attempts,
                        error = %err,
                        "HTTP request failed, retrying"
                    );
                    if !self.retry_backoff.is_zero() {
                        sleep(self.retry_backoff).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::from_settings(&HttpSettings::default())
    }
}
