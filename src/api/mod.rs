//! # Injective API access
//!
//! Thin typed layer over the Injective REST gateway that Peggo talks to.
//!
//! 1. [`client`] issues bounded-timeout GETs and turns every failure into a
//!    [`TransportError`](crate::error::TransportError) value, tracking whether
//!    the API is currently reachable.
//! 2. [`endpoints`] holds the fixed paths polled each cycle.
//!
//! The error-indicator rule shared by every endpoint lives here: any JSON
//! object carrying a top-level `code` field is the gateway reporting a failed
//! query rather than data, and is surfaced as a fatal
//! [`ProtocolError`](crate::error::ProtocolError).

pub mod client;
pub mod endpoints;

pub use client::{ApiClient, Reachability};

use serde_json::Value;
use tracing::error;

use crate::error::ProtocolError;

/// Field the gateway sets on error replies.
pub const ERROR_CODE_FIELD: &str = "code";

/// `true` when `body` is a gateway error object instead of a payload.
pub fn is_error_response(body: &Value) -> bool {
    body.as_object()
        .is_some_and(|obj| obj.contains_key(ERROR_CODE_FIELD))
}

/// Reject error objects, logging the full body.
///
/// # Errors
/// Returns [`ProtocolError`] when `body` carries a top-level `code` field.
pub fn ensure_not_error(endpoint: &'static str, body: &Value) -> Result<(), ProtocolError> {
    if is_error_response(body) {
        error!(endpoint, body = %body, "error encountered in API response");
        return Err(ProtocolError {
            endpoint,
            body: body.clone(),
        });
    }
    Ok(())
}
