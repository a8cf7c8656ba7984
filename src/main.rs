use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use peggo_exporter::cli::Args;
use peggo_exporter::logging::init_logging;
use peggo_exporter::{server, Config, ExporterError, ExporterMetrics, Poller};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), ExporterError> {
    info!("starting Peggo exporter");

    // Validation happens before anything is bound or polled.
    let config = Arc::new(Config::try_from(args)?);
    info!(
        polling_interval_secs = config.polling_interval.as_secs(),
        metrics_addr = %config.metrics_addr(),
        api_url = %config.api_url,
        orchestrator_address = %config.orchestrator_address,
        "configuration loaded"
    );

    let metrics = ExporterMetrics::new()?;
    let poller = Poller::new(Arc::clone(&config), metrics.clone())?;

    let listener = TcpListener::bind(config.metrics_addr()).await?;
    let server = tokio::spawn(server::serve(listener, metrics));

    let outcome = tokio::select! {
        res = poller.run() => res.map_err(ExporterError::from),
        _ = shutdown_signal() => {
            info!("shutdown signal received");
            Ok(())
        }
    };

    server.abort();
    outcome
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
