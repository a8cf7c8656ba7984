//! HTTP client for the Injective REST gateway.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::TransportError;

/// TCP connect timeout. Kept below the request timeout so a dead host fails
/// fast even when the request timeout is generous.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Change in API reachability caused by a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    /// First success after one or more failures (or after startup).
    Recovered,
    /// First failure after one or more successes.
    Degraded,
}

/// Issues GETs against the configured API base URL.
///
/// Every failure comes back as a [`TransportError`]; nothing here panics.
/// The client also remembers whether the last request succeeded so that
/// reachability changes are logged once per transition instead of on every
/// failed request.
#[derive(Debug)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    reachable: AtomicBool,
}

impl ApiClient {
    /// Build a client for `config.api_url` with `config.request_timeout`
    /// applied to every request.
    ///
    /// # Errors
    /// Returns the underlying [`reqwest::Error`] when the TLS backend cannot
    /// be initialised.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Self::with_timeout(config.api_url.clone(), config.request_timeout)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            http,
            reachable: AtomicBool::new(false),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the most recent request succeeded.
    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::Acquire)
    }

    /// GET `{base_url}{path}` and parse the body as JSON.
    ///
    /// # Returns
    /// - `Ok(Value)` on a 2xx response with a JSON body.
    /// - `Err(TransportError::Timeout)` when the request exceeds the timeout.
    /// - `Err(TransportError::Connection)` on DNS / connect / read failures.
    /// - `Err(TransportError::HttpStatus)` on a non-2xx response.
    /// - `Err(TransportError::Decode)` when a 2xx body is not JSON.
    pub async fn get_json(&self, path: &str) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "API request");

        let result = self.fetch(&url).await;
        match &result {
            Ok(body) => {
                debug!(%url, %body, "API response");
                if self.record_reachable(true) == Some(Reachability::Recovered) {
                    info!(base_url = %self.base_url, "successfully connected to API");
                }
            }
            Err(e) => {
                warn!(error = %e, "API request failed");
                if self.record_reachable(false) == Some(Reachability::Degraded) {
                    error!(
                        base_url = %self.base_url,
                        "API became unreachable, serving last known values until it recovers"
                    );
                }
            }
        }
        result
    }

    async fn fetch(&self, url: &str) -> Result<Value, TransportError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        if !resp.status().is_success() {
            return Err(TransportError::HttpStatus {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| classify(url, e))?;

        serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode {
            url: url.to_string(),
            detail: e.to_string(),
        })
    }

    /// Store the outcome of a request and report whether it flipped the
    /// reachability flag.
    pub fn record_reachable(&self, reachable: bool) -> Option<Reachability> {
        let was = self.reachable.swap(reachable, Ordering::AcqRel);
        match (was, reachable) {
            (false, true) => Some(Reachability::Recovered),
            (true, false) => Some(Reachability::Degraded),
            _ => None,
        }
    }
}

fn classify(url: &str, e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout { url: url.to_string() }
    } else {
        TransportError::Connection {
            url: url.to_string(),
            detail: e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
