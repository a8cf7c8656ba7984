use clap::Parser;

/// Default placeholder shipped in deployment templates. Never a real address.
pub const PLACEHOLDER_ORCHESTRATOR_ADDRESS: &str = "inj1xxxx";

#[derive(Parser, Debug, Clone)]
#[command(name = "peggo-exporter")]
#[command(version)]
#[command(about = "Prometheus exporter for Peggo bridge-orchestrator health")]
pub struct Args {
    /// Seconds to sleep between poll cycles
    #[arg(long, env = "POLLING_INTERVAL_SECONDS", default_value_t = 60)]
    pub polling_interval_seconds: u64,

    /// Port the /metrics endpoint listens on
    #[arg(long, env = "EXPORTER_PORT", default_value_t = 9877)]
    pub exporter_port: u16,

    /// Address the /metrics endpoint binds to
    #[arg(long, env = "EXPORTER_LISTEN_ADDR", default_value = "0.0.0.0")]
    pub listen_addr: std::net::IpAddr,

    /// Injective API endpoint, e.g. http://127.0.0.1:10337
    #[arg(long, env = "API_URL", default_value = "")]
    pub api_url: String,

    /// Injective orchestrator address of your validator
    #[arg(long, env = "ORCHESTRATOR_ADDRESS", default_value = PLACEHOLDER_ORCHESTRATOR_ADDRESS)]
    pub orchestrator_address: String,

    /// Per-request timeout against the API, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value_t = 10)]
    pub request_timeout_seconds: u64,

    /// Log filter used when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}
