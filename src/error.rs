//! Error types for the exporter.
//!
//! Failures fall into four classes with different fates:
//!
//! - [`TransportError`]: the upstream could not be reached or did not answer
//!   with JSON. Recoverable; the affected metric keeps its last-known value.
//! - [`DecodeError`]: the upstream answered, but not in the expected shape.
//!   Recoverable in the same way.
//! - [`ProtocolError`]: the upstream answered with an explicit error object.
//!   Fatal; the process exits.
//! - [`ConfigError`]: invalid startup configuration. Fatal before anything
//!   is bound or polled.

use thiserror::Error;

/// A failed HTTP round trip to the upstream API.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },
    /// The server replied with a non-2xx status code.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },
    /// DNS resolution or the TCP/TLS connection failed.
    #[error("connection to {url} failed: {detail}")]
    Connection { url: String, detail: String },
    /// A 2xx response whose body is not valid JSON.
    #[error("invalid JSON from {url}: {detail}")]
    Decode { url: String, detail: String },
}

/// A well-formed JSON response that does not carry the expected field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing or malformed field `{field}`")]
    Field { field: &'static str },
    #[error("unrecognized response shape")]
    UnrecognizedShape,
}

/// The upstream replied with an error object (`{"code": ...}`) instead of the
/// expected payload.
#[derive(Debug, Error)]
#[error("{endpoint} returned an error response: {body}")]
pub struct ProtocolError {
    pub endpoint: &'static str,
    pub body: serde_json::Value,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API URL must not be blank")]
    MissingApiUrl,
    #[error("API URL `{0}` must start with http:// or https://")]
    InvalidApiUrl(String),
    #[error("orchestrator address must not be blank")]
    MissingOrchestratorAddress,
    #[error("orchestrator address is still the placeholder `{0}`; provide your validator's orchestrator address")]
    PlaceholderOrchestratorAddress(String),
    #[error("{name} must be a positive number of seconds")]
    ZeroDuration { name: &'static str },
}

/// Crate-level error returned from startup and the top-level run loop.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
