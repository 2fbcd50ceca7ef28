//! hello-service: containerized REST service template.

use tokio::signal;
use tracing::info;

use hello_service::config::Config;
use hello_service::{startup, telemetry, validation};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::init()?;
    telemetry::setup_telemetry(&config);
    let metrics_handle = telemetry::init_metrics(&config);

    info!(
        version = %config.version,
        environment = %config.environment,
        debug = config.debug_enabled,
        server_port = %config.server_port,
        management_port = %config.management_port,
        memory_threshold = config.memory_threshold,
        disk_threshold = config.disk_threshold,
        external_timeout_ms = config.external_timeout_ms,
        retry_attempts = config.retry_attempts,
        pid = std::process::id(),
        "Starting hello-service"
    );

    // Fail fast on invalid configuration before the listener is opened.
    let report = validation::validate(&config);
    report.log();
    report.into_result()?;
    info!("Configuration validation completed successfully");

    let (app, addr) = startup::build_app(&config, metrics_handle)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
