//! Steem price feed
//!
//! Main entry point for the `pricefeed` binary

use std::env;
use std::process::ExitCode;

use tokio::signal;
use tracing::{error, info};

use steemfeed_core::FeedConfig;
use steemfeed_daemon::{
    init_logging, FeedService, DEFAULT_CONFIG_FILE, DEFAULT_LOG_FILE, ENV_CONFIG_FILE,
    ENV_LOG_FILE,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file
    dotenvy::dotenv().ok();

    let log_path = env::var(ENV_LOG_FILE).unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    if let Err(e) = init_logging(&log_path) {
        eprintln!("pricefeed: {e:#}");
        return ExitCode::FAILURE;
    }

    info!("Starting Steem price feed v{}", env!("CARGO_PKG_VERSION"));

    let config_path =
        env::var(ENV_CONFIG_FILE).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let service = match FeedConfig::load(&config_path)
        .map_err(anyhow::Error::from)
        .and_then(|config| FeedService::from_config(&config))
    {
        Ok(service) => service,
        Err(e) => {
            error!(config = %config_path, "startup failed: {:#}", e);
            eprintln!("pricefeed: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        _ = service.run() => {
            info!("Feed loop finished");
        }
        _ = shutdown_signal() => {
            info!("Shutting down");
        }
    }

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received termination signal");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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
