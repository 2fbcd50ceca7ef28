//! Request metrics middleware.
//!
//! Records request count and duration using the `metrics` crate (rendered
//! by the Prometheus exporter behind `/metrics`).
//!
//! # Metrics Emitted
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `http_requests_total` | Counter | `method`, `path`, `status` | Total request count |
//! | `http_request_duration_seconds` | Histogram | `method`, `path`, `status` | Request latency |
//!
//! Paths outside the known route set are bucketed as `/*` to keep label
//! cardinality bounded.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use http::{Request, Response};
use tower::{Layer, Service};

/// Known REST paths for metric label normalization.
///
/// Any path not in this list is reported as `/*` to keep the label
/// cardinality bounded.
const KNOWN_PATHS: &[&str] = &[
    "/",
    "/hello",
    "/health",
    "/health/live",
    "/health/ready",
    "/metrics",
];

/// Tower layer for request metrics collection.
#[derive(Clone, Copy, Default)]
pub struct MetricsLayer;

impl MetricsLayer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsMiddleware { inner }
    }
}

/// Metrics middleware service.
#[derive(Clone)]
pub struct MetricsMiddleware<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for MetricsMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let method = req.method().to_string();
        let path = normalize_path(req.uri().path());

        let start = Instant::now();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let response = inner.call(req).await?;

            let duration = start.elapsed().as_secs_f64();
            let status = response.status().as_u16().to_string();

            let labels = [("method", method), ("path", path), ("status", status)];

            metrics::counter!("http_requests_total", &labels).increment(1);
            metrics::histogram!("http_request_duration_seconds", &labels).record(duration);

            Ok(response)
        })
    }
}

/// Normalize paths to a known set to prevent label cardinality explosion.
///
/// Returns the path verbatim if it matches a known route, otherwise `/*`.
fn normalize_path(path: &str) -> String {
    if KNOWN_PATHS.contains(&path) {
        return path.to_string();
    }

    "/*".to_string()
}
