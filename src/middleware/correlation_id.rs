//! Correlation ID middleware for request tracing.
//!
//! Reads `X-Correlation-ID` from the inbound request (generating a fresh
//! UUID when absent or blank), binds it as the task-local correlation
//! context for the duration of the request, and echoes it on the response
//! under the same header. The task-local scope ends when the request future
//! completes or is dropped, so the binding cannot leak into the next
//! request handled by a reused worker.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use http::{HeaderValue, Request, Response};
use tower::{Layer, Service};

use crate::correlation::{self, CorrelationId, CORRELATION_ID_HEADER};

/// Tower layer for correlation ID propagation.
#[derive(Clone, Copy, Default)]
pub struct CorrelationIdLayer;

impl CorrelationIdLayer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Correlation ID middleware service.
#[derive(Clone)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CorrelationIdMiddleware<S>
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

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let correlation_id = extract_or_generate(&req);
        req.extensions_mut().insert(correlation_id.clone());

        let mut inner = self.inner.clone();

        Box::pin(correlation::scope(correlation_id.clone(), async move {
            let mut response = inner.call(req).await?;
            if let Ok(value) = HeaderValue::from_str(correlation_id.as_str()) {
                response.headers_mut().insert(CORRELATION_ID_HEADER, value);
            }
            Ok(response)
        }))
    }
}

fn extract_or_generate<T>(req: &Request<T>) -> CorrelationId {
    req.headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.trim().is_empty())
        .map(CorrelationId::from_str)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_header(value: &str) -> Request<()> {
        Request::builder()
            .header(CORRELATION_ID_HEADER, value)
            .body(())
            .unwrap()
    }

    #[test]
    fn supplied_header_is_preserved() {
        let req = request_with_header("test-123");
        assert_eq!(extract_or_generate(&req).as_str(), "test-123");
    }

    #[test]
    fn blank_header_generates_fresh_id() {
        let req = request_with_header("   ");
        let id = extract_or_generate(&req);
        assert!(!id.as_str().trim().is_empty());
        assert_ne!(id.as_str(), "   ");
    }

    #[test]
    fn missing_header_generates_fresh_id() {
        let req = Request::builder().body(()).unwrap();
        let id1 = extract_or_generate(&req);
        let id2 = extract_or_generate(&req);
        assert_ne!(id1.as_str(), id2.as_str());
    }
}
