//! API node health: reachable and not catching up.

use serde_json::Value;
use tracing::{info, warn};

use crate::api::{endpoints, ensure_not_error, ApiClient};
use crate::error::ProtocolError;

/// Health status of the API node behind the configured URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Reachable and fully synced.
    Healthy,
    /// Unreachable, still syncing, or reporting an unreadable sync status.
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    /// Gauge encoding: 1 healthy, 0 otherwise.
    pub fn as_gauge(&self) -> i64 {
        match self {
            HealthStatus::Healthy   => 1,
            HealthStatus::Unhealthy => 0,
        }
    }
}

/// Classify a decoded sync-status body. Only an explicit `"syncing": false`
/// counts as healthy.
pub fn classify_sync_status(body: &Value) -> HealthStatus {
    match body.get("syncing").and_then(Value::as_bool) {
        Some(false) => HealthStatus::Healthy,
        _ => HealthStatus::Unhealthy,
    }
}

/// Query the node's sync status.
///
/// # Errors
/// [`ProtocolError`] when the node answers with an error object. A transport
/// failure is reported as [`HealthStatus::Unhealthy`], not as an error.
pub async fn check_health(client: &ApiClient) -> Result<HealthStatus, ProtocolError> {
    info!(api_url = client.base_url(), "checking API node status");

    let body = match client.get_json(endpoints::SYNCING).await {
        Ok(body) => body,
        Err(_) => return Ok(HealthStatus::Unhealthy),
    };

    ensure_not_error("syncing", &body)?;

    let status = classify_sync_status(&body);
    match (status, body.get("syncing")) {
        (HealthStatus::Healthy, _) => info!("API node is up and synced"),
        (HealthStatus::Unhealthy, Some(Value::Bool(true))) => {
            info!("API node is up but still syncing")
        }
        (HealthStatus::Unhealthy, _) => warn!(body = %body, "unreadable sync status"),
    }
    Ok(status)
}
