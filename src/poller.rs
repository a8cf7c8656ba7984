//! # Poll loop
//!
//! ## Responsibility
//! Drives one poll cycle per interval:
//!
//! ```text
//! Idle -> CheckingHealth -> Skipped ------------------> Idle
//!                        \-> ExtractingMetrics -> Published -> Idle
//! ```
//!
//! ## Guarantees
//! - `peggo_api_status` is written every cycle, healthy or not.
//! - An unhealthy cycle issues no extraction request and leaves the other
//!   four gauges exactly as they were.
//! - A failed extraction republishes that metric's last-known value; it
//!   never disturbs the other metrics.
//! - All four extracted gauges are written together after every extraction
//!   has finished. A [`ProtocolError`] from any of them aborts the cycle
//!   before anything is written.
//!
//! ## NOT Responsible For
//! - Serving the registry (see [`crate::server`])
//! - Exiting the process on a protocol error (the caller does that)

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::ProtocolError;
use crate::extract::{extract, Metric};
use crate::health::{check_health, HealthStatus};
use crate::metrics::ExporterMetrics;
use crate::snapshot::LastKnown;

/// How a single cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The API node was unhealthy; only the status gauge was written.
    Skipped,
    /// All four extracted gauges were written.
    Published,
}

/// Owns the poll state for the lifetime of the process.
pub struct Poller {
    config: Arc<Config>,
    client: ApiClient,
    metrics: ExporterMetrics,
    last_known: LastKnown,
    last_healthy: bool,
}

impl Poller {
    /// # Errors
    /// Returns the [`reqwest::Error`] raised while building the HTTP client.
    pub fn new(config: Arc<Config>, metrics: ExporterMetrics) -> Result<Self, reqwest::Error> {
        let client = ApiClient::new(&config)?;
        Ok(Self::with_client(config, client, metrics))
    }

    pub fn with_client(config: Arc<Config>, client: ApiClient, metrics: ExporterMetrics) -> Self {
        Self {
            config,
            client,
            metrics,
            last_known: LastKnown::default(),
            last_healthy: false,
        }
    }

    pub fn last_known(&self) -> &LastKnown {
        &self.last_known
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Poll forever. The first cycle runs immediately; afterwards the loop
    /// sleeps `polling_interval` after each completed cycle.
    ///
    /// # Errors
    /// Returns only when a [`ProtocolError`] is hit.
    pub async fn run(mut self) -> Result<(), ProtocolError> {
        info!("fetching Peggo metrics");
        loop {
            self.run_cycle().await?;
            info!(
                seconds = self.config.polling_interval.as_secs(),
                "sleeping until next poll"
            );
            tokio::time::sleep(self.config.polling_interval).await;
        }
    }

    /// Run one health check and, if healthy, one round of extractions.
    ///
    /// # Errors
    /// [`ProtocolError`] when any response is a gateway error object. No
    /// extracted gauge is written in that case.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, ProtocolError> {
        let health = check_health(&self.client).await?;
        self.metrics.api_status.set(health.as_gauge());
        self.note_health(health);

        if !health.is_healthy() {
            info!("API is not available, skipping metric collection; will retry");
            return Ok(CycleOutcome::Skipped);
        }

        let address = self.config.orchestrator_address.as_str();
        let client = &self.client;
        let prior = self.last_known;

        let results = tokio::try_join!(
            extract(client, Metric::ObservedNonce, address, prior.get(Metric::ObservedNonce)),
            extract(client, Metric::ClaimEventNonce, address, prior.get(Metric::ClaimEventNonce)),
            extract(client, Metric::PendingValsets, address, prior.get(Metric::PendingValsets)),
            extract(client, Metric::PendingBatches, address, prior.get(Metric::PendingBatches)),
        )?;

        let (observed, claimed, valsets, batches) = results;
        let mut stale = 0usize;
        for (metric, extraction) in Metric::ALL.into_iter().zip([observed, claimed, valsets, batches]) {
            if extraction.stale {
                stale += 1;
            }
            let value = self.last_known.record(metric, extraction);
            self.metrics.set(metric, value);
        }

        if stale > 0 {
            warn!(stale, "published cycle with last known values for some metrics");
        }
        Ok(CycleOutcome::Published)
    }

    fn note_health(&mut self, health: HealthStatus) {
        let healthy = health.is_healthy();
        match (self.last_healthy, healthy) {
            (false, true) => info!("API node healthy, setting API status to 1"),
            (true, false) => warn!("API node unhealthy, setting API status to 0"),
            _ => {}
        }
        self.last_healthy = healthy;
    }
}
