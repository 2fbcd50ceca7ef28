//! Configuration with validation at startup.

use std::time::Duration;

use clap::Parser;

/// Allowed range for health check thresholds (percent).
const MIN_THRESHOLD_PERCENT: u32 = 50;
const MAX_THRESHOLD_PERCENT: u32 = 95;

/// Allowed range for external service timeouts (milliseconds).
const MIN_TIMEOUT_MS: u64 = 1000;
const MAX_TIMEOUT_MS: u64 = 60000;

/// Allowed range for external service retry attempts.
const MIN_RETRY_ATTEMPTS: u32 = 1;
const MAX_RETRY_ATTEMPTS: u32 = 10;

/// Service configuration.
///
/// All values can be set via environment variables or CLI arguments. The
/// snapshot is bound once at startup and never mutated afterwards.
#[derive(Debug, Clone, Parser)]
#[command(name = "hello-service", about = "Containerized REST service template")]
pub struct Config {
    /// Server port (range-checked by the startup validator)
    #[arg(long, env = "SERVER_PORT", default_value = "8080")]
    pub server_port: String,

    /// Management port for health/metrics probes (range-checked at startup)
    #[arg(long, env = "MANAGEMENT_PORT", default_value = "8081")]
    pub management_port: String,

    /// Application version
    #[arg(long, env = "APP_VERSION", default_value = env!("CARGO_PKG_VERSION"))]
    pub version: String,

    /// Environment name (e.g., "production", "development")
    #[arg(long, env = "APP_ENVIRONMENT", default_value = "development")]
    pub environment: String,

    /// Enable debug behavior
    #[arg(long, env = "DEBUG_ENABLED", default_value = "false", action = clap::ArgAction::Set)]
    pub debug_enabled: bool,

    /// Memory usage threshold for health checks, in percent (50-95)
    #[arg(long, env = "HEALTH_MEMORY_THRESHOLD", default_value = "80")]
    pub memory_threshold: u32,

    /// Disk usage threshold for health checks, in percent (50-95)
    #[arg(long, env = "HEALTH_DISK_THRESHOLD", default_value = "90")]
    pub disk_threshold: u32,

    /// External service call timeout in milliseconds (1000-60000)
    #[arg(long, env = "EXTERNAL_SERVICE_TIMEOUT_MS", default_value = "5000")]
    pub external_timeout_ms: u64,

    /// External service retry attempts (1-10)
    #[arg(long, env = "EXTERNAL_SERVICE_RETRY_ATTEMPTS", default_value = "3")]
    pub retry_attempts: u32,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    /// Max concurrent in-flight requests
    #[arg(long, env = "CONCURRENCY_LIMIT", default_value = "100")]
    pub concurrency_limit: usize,

    /// Max requests waiting for a free worker before shedding
    #[arg(long, env = "QUEUE_CAPACITY", default_value = "100")]
    pub queue_capacity: usize,

    /// CORS allowed origins (comma-separated, or "*" for any)
    #[arg(long, env = "CORS_ALLOW_ORIGINS")]
    pub cors_allow_origins: Option<String>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO")]
    pub log_level: String,

    /// Use JSON log format
    #[arg(long, env = "JSON_LOGS", default_value = "true", action = clap::ArgAction::Set)]
    pub json_logs: bool,
}

/// Configuration binding errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Application version cannot be blank")]
    BlankVersion,
    #[error("Application environment cannot be blank")]
    BlankEnvironment,
    #[error(
        "Memory threshold must be between {MIN_THRESHOLD_PERCENT} and {MAX_THRESHOLD_PERCENT}, got {0}"
    )]
    InvalidMemoryThreshold(u32),
    #[error(
        "Disk threshold must be between {MIN_THRESHOLD_PERCENT} and {MAX_THRESHOLD_PERCENT}, got {0}"
    )]
    InvalidDiskThreshold(u32),
    #[error("Service timeout must be between {MIN_TIMEOUT_MS}ms and {MAX_TIMEOUT_MS}ms, got {0}")]
    InvalidTimeout(u64),
    #[error(
        "Retry attempts must be between {MIN_RETRY_ATTEMPTS} and {MAX_RETRY_ATTEMPTS}, got {0}"
    )]
    InvalidRetryAttempts(u32),
    #[error("Concurrency limit must be > 0")]
    InvalidConcurrencyLimit,
    #[error("Queue capacity must be > 0")]
    InvalidQueueCapacity,
}

impl Config {
    /// Parse and validate configuration.
    pub fn init() -> anyhow::Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Validate field-level configuration constraints.
    ///
    /// Cross-field plausibility checks and port range checks live in the
    /// startup validator, which accumulates findings instead of stopping at
    /// the first one.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim().is_empty() {
            return Err(ConfigError::BlankVersion);
        }
        if self.environment.trim().is_empty() {
            return Err(ConfigError::BlankEnvironment);
        }
        if !(MIN_THRESHOLD_PERCENT..=MAX_THRESHOLD_PERCENT).contains(&self.memory_threshold) {
            return Err(ConfigError::InvalidMemoryThreshold(self.memory_threshold));
        }
        if !(MIN_THRESHOLD_PERCENT..=MAX_THRESHOLD_PERCENT).contains(&self.disk_threshold) {
            return Err(ConfigError::InvalidDiskThreshold(self.disk_threshold));
        }
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.external_timeout_ms) {
            return Err(ConfigError::InvalidTimeout(self.external_timeout_ms));
        }
        if !(MIN_RETRY_ATTEMPTS..=MAX_RETRY_ATTEMPTS).contains(&self.retry_attempts) {
            return Err(ConfigError::InvalidRetryAttempts(self.retry_attempts));
        }
        if self.concurrency_limit == 0 {
            return Err(ConfigError::InvalidConcurrencyLimit);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidQueueCapacity);
        }
        Ok(())
    }

    /// Whether the service runs under a production-like profile.
    pub fn is_production(&self) -> bool {
        matches!(
            self.environment.as_str(),
            "prod" | "production" | "k8s" | "kubernetes"
        )
    }

    /// Get per-request timeout as Duration.
    #[inline]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
