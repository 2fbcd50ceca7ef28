//! Request-scoped error handling and structured error responses.
//!
//! Errors raised while handling a request are contained at this boundary and
//! converted into an [`ErrorResponse`] carrying the active correlation ID,
//! so a caller can match a failure against the corresponding log lines.
//! Internal detail stays in the logs and never reaches the response body.

use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tower::BoxError;
use tracing::{error, warn};

use crate::correlation;

/// Structured error body returned to callers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl ErrorResponse {
    /// Build a response body for `status`, stamping the current time and
    /// the correlation ID bound to this request, if any.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message: message.into(),
            path: None,
            correlation_id: correlation::current().map(|id| id.as_str().to_string()),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(msg) => ErrorResponse::new(StatusCode::NOT_FOUND, msg).into_response(),
            Self::BadRequest(msg) => {
                ErrorResponse::new(StatusCode::BAD_REQUEST, msg).into_response()
            }
            Self::Internal(ref e) => {
                error!(error = %e, "Unhandled internal error");
                ErrorResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred while processing your request",
                )
                .into_response()
            }
        }
    }
}

/// Fallback handler for unmatched routes.
pub async fn not_found_handler(uri: Uri) -> Response {
    ErrorResponse::new(
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
    .with_path(uri.path())
    .into_response()
}

/// Convert admission-stack errors (load shedding) into structured responses.
pub async fn handle_middleware_error(uri: Uri, err: BoxError) -> Response {
    if err.is::<tower::load_shed::error::Overloaded>() {
        warn!(path = %uri.path(), "Request rejected: worker pool and backlog saturated");
        ErrorResponse::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Service is overloaded, try again later",
        )
        .with_path(uri.path())
        .into_response()
    } else {
        error!(error = %err, path = %uri.path(), "Middleware error");
        ErrorResponse::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An unexpected error occurred while processing your request",
        )
        .with_path(uri.path())
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::CorrelationId;

    #[test]
    fn error_response_fills_status_fields() {
        let body = ErrorResponse::new(StatusCode::NOT_FOUND, "missing").with_path("/nope");
        assert_eq!(body.status, 404);
        assert_eq!(body.error, "Not Found");
        assert_eq!(body.message, "missing");
        assert_eq!(body.path.as_deref(), Some("/nope"));
        assert!(body.correlation_id.is_none());
    }

    #[tokio::test]
    async fn error_response_captures_bound_correlation_id() {
        let body = correlation::scope(CorrelationId::from_str("corr-42"), async {
            ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "boom")
        })
        .await;
        assert_eq!(body.correlation_id.as_deref(), Some("corr-42"));
    }

    #[test]
    fn serialization_skips_absent_fields() {
        let body = ErrorResponse::new(StatusCode::BAD_REQUEST, "bad");
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("path").is_none());
        assert!(json.get("correlationId").is_none());
        assert_eq!(json["status"], 400);
    }

    #[tokio::test]
    async fn internal_error_hides_detail() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(!body["message"].as_str().unwrap().contains("10.0.0.3"));
    }

    #[tokio::test]
    async fn bad_request_preserves_message() {
        let response = AppError::BadRequest("name is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "name is required");
    }
}
