//! Startup configuration validation.
//!
//! Runs once after configuration binding and strictly before the listening
//! socket is opened. Hard errors abort the bootstrap; warnings are logged
//! and never block startup. All checks run and accumulate their findings,
//! so a single pass reports every problem at once.

use tracing::{error, warn};

use crate::config::Config;

/// Warn when timeout x retries exceeds this total wait (5 minutes).
pub const MAX_TOTAL_WAIT_MS: u64 = 300_000;

/// Valid port range for server and management ports.
const PORT_RANGE: std::ops::RangeInclusive<u32> = 1..=65535;

/// Environment variables expected to be set explicitly under production
/// profiles. Their absence is a warning, not an error.
const PRODUCTION_ENV_VARS: &[&str] = &["SERVER_PORT", "MANAGEMENT_PORT", "LOG_LEVEL"];

/// Accumulated outcome of startup validation.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Fatal configuration error raised when hard errors accumulated.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Configuration validation failed:\n{0}")]
    Failed(String),
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Log all accumulated findings through the tracing stack.
    pub fn log(&self) {
        for warning in &self.warnings {
            warn!("{warning}");
        }
        for err in &self.errors {
            error!("{err}");
        }
    }

    /// Convert into a terminal error if any hard error accumulated.
    ///
    /// Configuration is static for the process lifetime, so there is no
    /// retry path: the caller must abort the bootstrap sequence.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Failed(self.errors.join("\n")))
        }
    }
}

/// Validate configuration against the process environment.
pub fn validate(config: &Config) -> ValidationReport {
    validate_with_env(config, |key| std::env::var(key).ok())
}

/// Validation seam taking an explicit environment lookup.
pub fn validate_with_env<F>(config: &Config, env: F) -> ValidationReport
where
    F: Fn(&str) -> Option<String>,
{
    let mut report = ValidationReport::default();

    if config.is_production() {
        check_production_overrides(&env, &mut report);
    }
    check_ports(config, &mut report);
    check_health_thresholds(config, &mut report);
    check_external_service(config, &mut report);

    report
}

fn check_production_overrides<F>(env: &F, report: &mut ValidationReport)
where
    F: Fn(&str) -> Option<String>,
{
    for var in PRODUCTION_ENV_VARS {
        if env(var).is_none() {
            report
                .warnings
                .push(format!("{var} environment variable not set, using default"));
        }
    }
}

fn check_ports(config: &Config, report: &mut ValidationReport) {
    let ports = [
        ("Server port", &config.server_port),
        ("Management port", &config.management_port),
    ];

    for (name, value) in ports {
        match value.parse::<u32>() {
            Ok(port) if PORT_RANGE.contains(&port) => {}
            Ok(port) => report
                .errors
                .push(format!("{name} must be between 1 and 65535, got: {port}")),
            Err(_) => report
                .errors
                .push(format!("{name} is not a valid number: {value}")),
        }
    }
}

fn check_health_thresholds(config: &Config, report: &mut ValidationReport) {
    // Plausibility check, not a correctness constraint.
    if config.memory_threshold >= config.disk_threshold {
        report.warnings.push(format!(
            "Memory threshold ({}) is higher than or equal to disk threshold ({}). \
             This might cause unexpected behavior.",
            config.memory_threshold, config.disk_threshold
        ));
    }
}

fn check_external_service(config: &Config, report: &mut ValidationReport) {
    let total_wait_ms = config.external_timeout_ms * u64::from(config.retry_attempts);
    if total_wait_ms > MAX_TOTAL_WAIT_MS {
        report.warnings.push(format!(
            "Total potential wait time for external service calls is {total_wait_ms}ms ({}s). \
             Consider reducing timeout or retry attempts.",
            total_wait_ms / 1000
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server_port: "8080".to_string(),
            management_port: "8081".to_string(),
            version: "0.1.0".to_string(),
            environment: "development".to_string(),
            debug_enabled: false,
            memory_threshold: 80,
            disk_threshold: 90,
            external_timeout_ms: 5000,
            retry_attempts: 3,
            request_timeout_secs: 30,
            concurrency_limit: 100,
            queue_capacity: 100,
            cors_allow_origins: None,
            log_level: "INFO".to_string(),
            json_logs: false,
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn clean_config_produces_empty_report() {
        let report = validate_with_env(&test_config(), no_env);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn inverted_thresholds_warn_but_pass() {
        let mut config = test_config();
        config.memory_threshold = 90;
        config.disk_threshold = 80;

        let report = validate_with_env(&config, no_env);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Memory threshold"));
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn equal_thresholds_warn() {
        let mut config = test_config();
        config.memory_threshold = 90;
        config.disk_threshold = 90;

        let report = validate_with_env(&config, no_env);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn out_of_range_port_is_hard_error() {
        let mut config = test_config();
        config.server_port = "70000".to_string();

        let report = validate_with_env(&config, no_env);
        assert!(!report.is_ok());
        assert!(report.errors[0].contains("70000"));
        assert!(report.into_result().is_err());
    }

    #[test]
    fn unparseable_port_is_hard_error() {
        let mut config = test_config();
        config.management_port = "eight-thousand".to_string();

        let report = validate_with_env(&config, no_env);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("not a valid number"));
    }

    #[test]
    fn port_errors_accumulate() {
        let mut config = test_config();
        config.server_port = "0".to_string();
        config.management_port = "65536".to_string();

        let report = validate_with_env(&config, no_env);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn excessive_total_wait_warns_but_passes() {
        let mut config = test_config();
        config.external_timeout_ms = 60000;
        config.retry_attempts = 10;

        let report = validate_with_env(&config, no_env);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("600000ms"));
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn total_wait_at_limit_does_not_warn() {
        let mut config = test_config();
        config.external_timeout_ms = 60000;
        config.retry_attempts = 5; // exactly 300000ms

        let report = validate_with_env(&config, no_env);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn production_without_overrides_warns_but_passes() {
        let mut config = test_config();
        config.environment = "kubernetes".to_string();

        let report = validate_with_env(&config, no_env);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), PRODUCTION_ENV_VARS.len());
        assert!(report.warnings.iter().any(|w| w.contains("SERVER_PORT")));
    }

    #[test]
    fn production_with_overrides_does_not_warn() {
        let mut config = test_config();
        config.environment = "prod".to_string();

        let report = validate_with_env(&config, |_| Some("set".to_string()));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn development_profile_skips_override_checks() {
        let report = validate_with_env(&test_config(), no_env);
        assert!(report.warnings.is_empty());
    }
}
