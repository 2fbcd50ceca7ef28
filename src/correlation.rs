//! Correlation ID context for request tracing.
//!
//! The ID is bound to a task-local at request entry and dropped when the
//! request future completes or is cancelled, so it can be read from anywhere
//! in the call stack without threading it through function signatures.

use std::future::Future;
use std::sync::Arc;

use uuid::Uuid;

/// Header name for correlation ID propagation.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

tokio::task_local! {
    static CORRELATION_ID: CorrelationId;
}

/// Correlation ID for the current request.
#[derive(Debug, Clone)]
pub struct CorrelationId(pub Arc<str>);

impl CorrelationId {
    /// Generate a new random correlation ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string().into())
    }

    /// Create from an existing string.
    pub fn from_str(s: &str) -> Self {
        Self(s.into())
    }

    /// Get as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::generate()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Get the correlation ID bound to the current task, if any.
pub fn current() -> Option<CorrelationId> {
    CORRELATION_ID.try_with(Clone::clone).ok()
}

/// Run `fut` with `id` bound as the current correlation ID.
///
/// The binding ends with the future, so a reused worker never observes an
/// ID from a previous request.
pub async fn scope<F>(id: CorrelationId, fut: F) -> F::Output
where
    F: Future,
{
    CORRELATION_ID.scope(id, fut).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let id1 = CorrelationId::generate();
        let id2 = CorrelationId::generate();
        assert_ne!(id1.as_str(), id2.as_str());
    }

    #[test]
    fn from_str_preserves_value() {
        let id = CorrelationId::from_str("custom-id");
        assert_eq!(id.as_str(), "custom-id");
    }

    #[tokio::test]
    async fn scope_binds_and_clears() {
        assert!(current().is_none());

        scope(CorrelationId::from_str("test-123"), async {
            assert_eq!(current().unwrap().as_str(), "test-123");
        })
        .await;

        assert!(current().is_none());
    }

    #[tokio::test]
    async fn nested_scopes_restore_outer_binding() {
        scope(CorrelationId::from_str("outer"), async {
            scope(CorrelationId::from_str("inner"), async {
                assert_eq!(current().unwrap().as_str(), "inner");
            })
            .await;
            assert_eq!(current().unwrap().as_str(), "outer");
        })
        .await;
    }
}
