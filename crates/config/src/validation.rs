//! Configuration validation utilities

use crate::loader::{MAX_TIMEOUT_SECONDS, VALID_LOG_FORMATS, VALID_LOG_LEVELS};
use crate::schema::{Config, RelayConfig};
use std::collections::HashSet;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate complete configuration
    pub fn validate(config: &Config) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::validate_relays(config, &mut report);
        Self::validate_logging(config, &mut report);

        report
    }

    fn validate_relays(config: &Config, report: &mut ValidationReport) {
        if config.relays.is_empty() {
            report.add_error("relays", "At least one relay must be configured");
            return;
        }

        let enabled_count = config.relays.iter().filter(|r| r.enabled).count();
        if enabled_count == 0 {
            report.add_error("relays", "At least one relay must be enabled");
        }

        if enabled_count == 1 {
            report.add_warning("relays", "Only one relay is enabled, consider enabling multiple relays for comparison");
        }

        let mut names = HashSet::new();
        for relay in &config.relays {
            if !names.insert(&relay.name) {
                report.add_warning("relays", &format!("Duplicate relay name: {}", relay.name));
            }

            Self::validate_relay(relay, report);
        }
    }

    fn validate_relay(relay: &RelayConfig, report: &mut ValidationReport) {
        if relay.name.is_empty() {
            report.add_error("relays.name", "Relay name cannot be empty");
        }

        if relay.address.is_empty() {
            report.add_error("relays.address", &format!("Address cannot be empty for relay {}", relay.name));
        } else if relay.address.starts_with("http://") {
            report.add_warning("relays.address", &format!("Address for {} should use HTTPS", relay.name));
        } else if !relay.address.starts_with("https://") {
            report.add_error("relays.address", &format!("Address for {} must be an http(s) URL", relay.name));
        }

        if relay.timeout_seconds == 0 {
            report.add_error("relays.timeout_seconds", &format!("Timeout cannot be zero for relay {}", relay.name));
        } else if relay.timeout_seconds > MAX_TIMEOUT_SECONDS {
            report.add_error(
                "relays.timeout_seconds",
                &format!("Timeout is too high for relay {} ({}s)", relay.name, relay.timeout_seconds),
            );
        } else if relay.timeout_seconds > 60 {
            report.add_warning(
                "relays.timeout_seconds",
                &format!("Timeout is very high for relay {} ({}s)", relay.name, relay.timeout_seconds),
            );
        }
    }

    fn validate_logging(config: &Config, report: &mut ValidationReport) {
        if !VALID_LOG_LEVELS.contains(&config.logging.level.as_str()) {
            report.add_error(
                "logging.level",
                &format!("Invalid log level: {}. Valid levels: {:?}", config.logging.level, VALID_LOG_LEVELS),
            );
        }

        if !VALID_LOG_FORMATS.contains(&config.logging.format.as_str()) {
            report.add_error(
                "logging.format",
                &format!("Invalid log format: {}. Valid formats: {:?}", config.logging.format, VALID_LOG_FORMATS),
            );
        }

        if config.logging.level == "trace" || config.logging.level == "debug" {
            report.add_warning("logging.level", "Debug/trace logging includes every request URL and response status");
        }
    }
}

/// Validation report containing errors and warnings
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation issue (error or warning)
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn summary(&self) -> String {
        format!("Validation: {} errors, {} warnings", self.errors.len(), self.warnings.len())
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
