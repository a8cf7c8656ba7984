//! Validated runtime configuration.
//!
//! [`Config`] is built once from [`Args`] before anything is bound or polled
//! and is read-only afterwards. Every check that can fail at startup lives in
//! the `TryFrom<Args>` impl, so an invalid address never reaches the loop.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::cli::{Args, PLACEHOLDER_ORCHESTRATOR_ADDRESS};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the Injective API with any trailing `/` removed.
    pub api_url: String,
    pub orchestrator_address: String,
    pub polling_interval: Duration,
    pub request_timeout: Duration,
    pub listen_addr: IpAddr,
    pub exporter_port: u16,
    pub log_level: String,
}

impl Config {
    /// Socket address the metrics responder binds to.
    pub fn metrics_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_addr, self.exporter_port)
    }
}

impl TryFrom<Args> for Config {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let api_url = args.api_url.trim().trim_end_matches('/').to_string();
        if api_url.is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(api_url));
        }

        let orchestrator_address = args.orchestrator_address.trim().to_string();
        if orchestrator_address.is_empty() {
            return Err(ConfigError::MissingOrchestratorAddress);
        }
        if orchestrator_address == PLACEHOLDER_ORCHESTRATOR_ADDRESS {
            return Err(ConfigError::PlaceholderOrchestratorAddress(orchestrator_address));
        }

        if args.polling_interval_seconds == 0 {
            return Err(ConfigError::ZeroDuration { name: "polling interval" });
        }
        if args.request_timeout_seconds == 0 {
            return Err(ConfigError::ZeroDuration { name: "request timeout" });
        }

        Ok(Config {
            api_url,
            orchestrator_address,
            polling_interval: Duration::from_secs(args.polling_interval_seconds),
            request_timeout: Duration::from_secs(args.request_timeout_seconds),
            listen_addr: args.listen_addr,
            exporter_port: args.exporter_port,
            log_level: args.log_level,
        })
    }
}
