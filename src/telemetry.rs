//! Telemetry setup for structured logging and Prometheus metrics.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::Config;

/// Service name constant
pub const SERVICE_NAME: &str = "hello-service";

/// Initialize the Prometheus metrics exporter with common labels and return
/// the handle for the /metrics endpoint.
///
/// # Panics
/// Panics if the Prometheus recorder fails to install.
#[must_use]
pub fn init_metrics(config: &Config) -> PrometheusHandle {
    let deployment = if config.is_production() {
        "containerized"
    } else {
        "local"
    };

    PrometheusBuilder::new()
        .add_global_label("application", SERVICE_NAME)
        .add_global_label("environment", config.environment.clone())
        .add_global_label("version", config.version.clone())
        .add_global_label("deployment", deployment)
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Setup the logging/tracing stack.
///
/// Console logging only, JSON or human-readable depending on config.
///
/// # Panics
/// Panics if the tracing subscriber cannot be initialized.
pub fn setup_telemetry(config: &Config) {
    let level = match config.log_level.to_uppercase().as_str() {
        "TRACE" => Level::TRACE,
        "DEBUG" => Level::DEBUG,
        "WARN" => Level::WARN,
        "ERROR" => Level::ERROR,
        _ => Level::INFO,
    };

    let env_filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("tower=info".parse().unwrap())
        .add_directive("h2=info".parse().unwrap())
        .add_directive("hyper=info".parse().unwrap());

    // Build fmt layer based on config
    let fmt_layer = if config.json_logs {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_timer(ChronoLocal::new("%H:%M:%S%.3f".to_string()))
            .compact()
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
