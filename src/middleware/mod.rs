//! Tower middleware for the request pipeline.
//!
//! # Middleware Order
//! Middleware is applied in layers. When using `.layer()` on a router:
//! - Outermost layer is added last
//! - Request flows: outermost → innermost → handler
//! - Response flows: handler → innermost → outermost
//!
//! Recommended order (outermost first):
//! 1. CorrelationIdLayer - Extract/generate correlation ID first
//! 2. TraceLayer - Request span carrying the correlation ID
//! 3. MetricsLayer - Request count and latency
//! 4. TimeoutLayer - Request timeout
//! 5. CorsLayer - CORS handling
//! 6. Admission (load shed + concurrency limits) - Backpressure control

pub mod correlation_id;
pub mod metrics;

pub use correlation_id::CorrelationIdLayer;
pub use metrics::MetricsLayer;
