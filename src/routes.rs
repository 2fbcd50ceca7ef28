//! REST routes and handlers.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::config::Config;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: String,
    environment: String,
}

/// Build REST routes with the given application state.
pub fn rest_routes(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/", get(|| async { "hello-service" }))
        .route("/hello", get(hello_handler))
        .route("/health", get(|| async { "OK" }))
        .route("/health/live", get(|| async { "OK" }))
        .route("/health/ready", get(readiness_handler))
        .route(
            "/metrics",
            get(move || {
                let handle = metrics_handle.clone();
                async move { handle.render() }
            }),
        )
        .with_state(state)
}

/// GET /hello
async fn hello_handler() -> &'static str {
    "Hello World"
}

async fn readiness_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: state.config.version.clone(),
        environment: state.config.environment.clone(),
    })
}
