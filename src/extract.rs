//! # Metric extraction
//!
//! Turns one API response into one gauge value. Each [`Metric`] knows its
//! route and how to decode that route's body; [`extract`] wraps the round
//! trip with the fallback policy:
//!
//! - transport failure: keep the prior value, marked stale, no decoding
//! - gateway error object: [`ProtocolError`], which ends the process
//! - unexpected body shape: log the body, keep the prior value
//! - otherwise: the fresh value

use serde_json::Value;
use tracing::{error, info};

use crate::api::{endpoints, ensure_not_error, ApiClient};
use crate::error::{DecodeError, ProtocolError};

/// The four values derived from the orchestrator's view of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Last Ethereum event nonce the chain has observed.
    ObservedNonce,
    /// Last Ethereum event nonce this orchestrator has claimed.
    ClaimEventNonce,
    /// Valsets awaiting this orchestrator's signature.
    PendingValsets,
    /// Batches awaiting this orchestrator's signature.
    PendingBatches,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::ObservedNonce,
        Metric::ClaimEventNonce,
        Metric::PendingValsets,
        Metric::PendingBatches,
    ];

    /// Short route name used in logs and [`ProtocolError::endpoint`].
    pub fn endpoint(&self) -> &'static str {
        match self {
            Metric::ObservedNonce   => "module_state",
            Metric::ClaimEventNonce => "oracle_event",
            Metric::PendingValsets  => "valset_last",
            Metric::PendingBatches  => "batch_last",
        }
    }

    /// Path and query relative to the API base URL.
    pub fn path(&self, orchestrator_address: &str) -> String {
        match self {
            Metric::ObservedNonce   => endpoints::MODULE_STATE.to_string(),
            Metric::ClaimEventNonce => endpoints::oracle_event(orchestrator_address),
            Metric::PendingValsets  => endpoints::last_pending_valsets(orchestrator_address),
            Metric::PendingBatches  => endpoints::last_pending_batches(orchestrator_address),
        }
    }

    /// Decode a non-error response body into the metric value.
    ///
    /// # Errors
    /// [`DecodeError::Field`] when the expected field is missing or has the
    /// wrong type; [`DecodeError::UnrecognizedShape`] when a batch response
    /// carries neither `batch` nor `batches`.
    pub fn decode(&self, body: &Value) -> Result<u64, DecodeError> {
        match self {
            Metric::ObservedNonce => nonce_at(body, "/state/last_observed_nonce", "state.last_observed_nonce"),
            Metric::ClaimEventNonce => nonce_at(
                body,
                "/last_claim_event/ethereum_event_nonce",
                "last_claim_event.ethereum_event_nonce",
            ),
            Metric::PendingValsets => list_len(body.get("valsets"), "valsets"),
            Metric::PendingBatches => pending_batches(body),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Metric::ObservedNonce   => "last_observed_nonce",
            Metric::ClaimEventNonce => "last_claim_eth_event_nonce",
            Metric::PendingValsets  => "pending_valsets",
            Metric::PendingBatches  => "pending_batches",
        };
        write!(f, "{s}")
    }
}

/// Result of one extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction {
    pub value: u64,
    /// `true` when `value` is the last-known value rather than a fresh read.
    pub stale: bool,
}

impl Extraction {
    pub fn fresh(value: u64) -> Self {
        Self { value, stale: false }
    }

    pub fn stale(prior: u64) -> Self {
        Self { value: prior, stale: true }
    }
}

/// Fetch and decode `metric`, falling back to `prior` on any recoverable
/// failure.
///
/// # Errors
/// Only [`ProtocolError`]; every other failure yields `Ok` with a stale value.
pub async fn extract(
    client: &ApiClient,
    metric: Metric,
    orchestrator_address: &str,
    prior: u64,
) -> Result<Extraction, ProtocolError> {
    let body = match client.get_json(&metric.path(orchestrator_address)).await {
        Ok(body) => body,
        Err(_) => {
            // The transport error itself was logged by the client.
            info!(%metric, value = prior, "using last known value");
            return Ok(Extraction::stale(prior));
        }
    };

    ensure_not_error(metric.endpoint(), &body)?;

    match metric.decode(&body) {
        Ok(value) => {
            info!(%metric, value, "fetched");
            Ok(Extraction::fresh(value))
        }
        Err(e) => {
            error!(
                %metric,
                error = %e,
                body = %body,
                value = prior,
                "unable to process response, using last known value"
            );
            Ok(Extraction::stale(prior))
        }
    }
}

fn nonce_at(body: &Value, pointer: &str, field: &'static str) -> Result<u64, DecodeError> {
    body.pointer(pointer)
        .and_then(as_u64_lenient)
        .ok_or(DecodeError::Field { field })
}

/// Cosmos gateways render `uint64` as a decimal string; accept both forms.
fn as_u64_lenient(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Length of a list field. An explicit `null` is an empty list as rendered by
/// some gateway versions.
fn list_len(field_value: Option<&Value>, field: &'static str) -> Result<u64, DecodeError> {
    match field_value {
        Some(Value::Array(items)) => Ok(items.len() as u64),
        Some(Value::Null) => Ok(0),
        _ => Err(DecodeError::Field { field }),
    }
}

/// Older gateways answer `{"batch": obj|null}` for a single pending batch,
/// newer ones `{"batches": [...]}`.
fn pending_batches(body: &Value) -> Result<u64, DecodeError> {
    let obj = body.as_object().ok_or(DecodeError::UnrecognizedShape)?;
    if let Some(batch) = obj.get("batch") {
        return Ok(if batch.is_null() { 0 } else { 1 });
    }
    if obj.contains_key("batches") {
        return list_len(obj.get("batches"), "batches");
    }
    Err(DecodeError::UnrecognizedShape)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
