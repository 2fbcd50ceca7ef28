//! Server wiring: middleware stack and router assembly.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::Router;
use http::Request;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::config::Config;
use crate::correlation::CorrelationId;
use crate::error;
use crate::middleware::{CorrelationIdLayer, MetricsLayer};
use crate::routes::{rest_routes, AppState};

/// Build and configure the complete application.
pub fn build_app(
    config: &Config,
    metrics_handle: PrometheusHandle,
) -> anyhow::Result<(Router, SocketAddr)> {
    let addr: SocketAddr = format!("0.0.0.0:{}", config.server_port).parse()?;

    let state = AppState {
        config: Arc::new(config.clone()),
    };

    let app = apply_middleware(
        rest_routes(state, metrics_handle).fallback(error::not_found_handler),
        config,
    );

    Ok((app, addr))
}

/// Wrap a router with the full middleware stack.
///
/// Separate from [`build_app`] so tests can run the same stack around
/// purpose-built routers.
pub fn apply_middleware(router: Router, config: &Config) -> Router {
    let cors = build_cors(config.cors_allow_origins.as_deref());

    // Bounded admission: the outer limit caps requests in the system
    // (executing + backlog), the inner one caps actual concurrency. Once
    // the outer limit is exhausted, load_shed rejects immediately instead
    // of queueing without bound.
    let admission = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(error::handle_middleware_error))
        .load_shed()
        .layer(GlobalConcurrencyLimitLayer::new(
            config.concurrency_limit + config.queue_capacity,
        ))
        .layer(GlobalConcurrencyLimitLayer::new(config.concurrency_limit));

    // Build middleware stack with ServiceBuilder (executes top-to-bottom on request)
    let middleware = ServiceBuilder::new()
        // 1. Correlation ID - generate/propagate first, so even shed
        //    requests carry one
        .layer(CorrelationIdLayer::new())
        // 2. Tracing - request span carrying the correlation ID
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    let correlation_id = req
                        .extensions()
                        .get::<CorrelationId>()
                        .map_or("unknown", CorrelationId::as_str);
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        uri = %req.uri(),
                        correlation_id = %correlation_id,
                    )
                })
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::DEBUG)),
        )
        // 3. Metrics - count and time every request, including shed ones
        .layer(MetricsLayer::new())
        // 4. Timeout - prevent hung requests
        .layer(TimeoutLayer::new(config.request_timeout()))
        // 5. CORS - handle preflight before admission
        .layer(cors);

    router.layer(admission).layer(middleware)
}

fn build_cors(origins: Option<&str>) -> CorsLayer {
    let cors = match origins {
        Some(o) if o.trim() == "*" => CorsLayer::permissive(),
        Some(o) => {
            let origins: Vec<_> = o.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            CorsLayer::new().allow_origin(origins)
        }
        None => CorsLayer::permissive(),
    };

    cors.allow_headers(Any)
        .expose_headers([http::HeaderName::from_static("x-correlation-id")])
        .allow_methods(Any)
        .max_age(Duration::from_secs(3600))
}
