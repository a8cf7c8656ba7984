//! # peggo-exporter
//!
//! Polls an Injective API node on a fixed interval and publishes the health
//! of a Peggo bridge orchestrator as Prometheus gauges.
//!
//! ```rust,ignore
//! let config = Arc::new(Config::try_from(Args::parse())?);
//! let metrics = ExporterMetrics::new()?;
//! let listener = TcpListener::bind(config.metrics_addr()).await?;
//! tokio::spawn(server::serve(listener, metrics.clone()));
//! Poller::new(config, metrics)?.run().await?;
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod poller;
pub mod server;
pub mod snapshot;

pub use config::Config;
pub use error::{ConfigError, ExporterError, ProtocolError, TransportError};
pub use metrics::ExporterMetrics;
pub use poller::{CycleOutcome, Poller};
