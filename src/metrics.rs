//! Prometheus gauges published by the exporter.
//!
//! [`ExporterMetrics`] owns a dedicated [`Registry`]; the poller writes the
//! gauges and the responder encodes the registry on each scrape. Gauges are
//! atomics, so a scrape racing a write sees either the old or the new value,
//! never a torn one.

use prometheus::{register_int_gauge_with_registry, Encoder, IntGauge, Registry, TextEncoder};

use crate::extract::Metric;

/// Content type of the Prometheus text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone, Debug)]
pub struct ExporterMetrics {
    registry: Registry,
    pub api_status: IntGauge,
    pub last_observed_nonce: IntGauge,
    pub last_claim_eth_event_nonce: IntGauge,
    pub pending_valsets: IntGauge,
    pub pending_batches: IntGauge,
}

impl ExporterMetrics {
    /// Create the five gauges under a fresh registry.
    ///
    /// # Errors
    /// Fails only if a gauge name collides within the registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        Ok(Self {
            api_status: register_int_gauge_with_registry!(
                "peggo_api_status",
                "Peggo API Status",
                registry,
            )?,
            last_observed_nonce: register_int_gauge_with_registry!(
                "peggo_last_observed_nonce",
                "Last Observed Peggo Nonce",
                registry,
            )?,
            last_claim_eth_event_nonce: register_int_gauge_with_registry!(
                "peggo_last_claim_eth_event_nonce",
                "Latest Orchestrator Nonce",
                registry,
            )?,
            pending_valsets: register_int_gauge_with_registry!(
                "peggo_pending_valsets",
                "Pending Valsets",
                registry,
            )?,
            pending_batches: register_int_gauge_with_registry!(
                "peggo_pending_batches",
                "Pending Batches",
                registry,
            )?,
            registry,
        })
    }

    pub fn gauge(&self, metric: Metric) -> &IntGauge {
        match metric {
            Metric::ObservedNonce   => &self.last_observed_nonce,
            Metric::ClaimEventNonce => &self.last_claim_eth_event_nonce,
            Metric::PendingValsets  => &self.pending_valsets,
            Metric::PendingBatches  => &self.pending_batches,
        }
    }

    /// Set the gauge for `metric`, saturating values above `i64::MAX`.
    pub fn set(&self, metric: Metric, value: u64) {
        self.gauge(metric).set(i64::try_from(value).unwrap_or(i64::MAX));
    }

    /// Current values of the four extracted gauges, in [`Metric::ALL`] order.
    pub fn values(&self) -> [i64; 4] {
        Metric::ALL.map(|m| self.gauge(m).get())
    }

    /// Render the registry in the Prometheus text format.
    ///
    /// # Errors
    /// Propagates encoder failures, which only occur on invalid metric data.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
