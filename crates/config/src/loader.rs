//! Configuration loader implementation

use crate::schema::Config;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use http::HeaderName;
use std::path::Path;
use types::ConfigError;

/// Upper bound on a relay request timeout
pub const MAX_TIMEOUT_SECONDS: u64 = 300;

pub const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
pub const VALID_LOG_FORMATS: [&str; 2] = ["json", "pretty"];

/// Configuration loader that handles YAML files and environment variables
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Config> {
        let config_path = config_path.as_ref();

        if !config_path.exists() {
            return Err(ConfigError::FileNotFound {
                path: config_path.display().to_string(),
            }
            .into());
        }

        let config: Config = Figment::new()
            .merge(Yaml::file(config_path))
            // Override with environment variables, e.g. RELAY_CLIENT_LOGGING__FORMAT
            .merge(Env::prefixed("RELAY_CLIENT_").split("__"))
            .merge(Env::raw().only(&["RUST_LOG"]).map(|_| "logging.filter".into()))
            .extract()
            .context("Failed to parse configuration")?;

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from string (for testing)
    pub fn load_from_str(yaml_content: &str) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Yaml::string(yaml_content))
            .extract()
            .context("Failed to parse configuration from string")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Reject configurations the client cannot run with
    fn validate(config: &Config) -> std::result::Result<(), ConfigError> {
        if config.relays.is_empty() {
            return Err(ConfigError::MissingField {
                field: "relays".to_string(),
            });
        }

        for relay in &config.relays {
            if relay.name.is_empty() {
                return Err(ConfigError::ValidationError {
                    field: "relays.name".to_string(),
                    message: "Relay name cannot be empty".to_string(),
                });
            }

            if !relay.address.starts_with("http://") && !relay.address.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    field: format!("relays.{}.address", relay.name),
                    value: relay.address.clone(),
                });
            }

            if relay.timeout_seconds == 0 {
                return Err(ConfigError::ValidationError {
                    field: "relays.timeout_seconds".to_string(),
                    message: format!("Timeout must be greater than 0 for relay {}", relay.name),
                });
            }

            if relay.timeout_seconds > MAX_TIMEOUT_SECONDS {
                return Err(ConfigError::ValidationError {
                    field: "relays.timeout_seconds".to_string(),
                    message: format!("Timeout too high for relay {} (max {MAX_TIMEOUT_SECONDS}s)", relay.name),
                });
            }

            if let Some(name) = relay
                .extra_headers
                .keys()
                .find(|name| HeaderName::from_bytes(name.as_bytes()).is_err())
            {
                return Err(ConfigError::InvalidValue {
                    field: format!("relays.{}.extra_headers", relay.name),
                    value: name.clone(),
                });
            }
        }

        if !VALID_LOG_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logging.level".to_string(),
                message: format!(
                    "Invalid log level: {}. Valid levels: {:?}",
                    config.logging.level, VALID_LOG_LEVELS
                ),
            });
        }

        if !VALID_LOG_FORMATS.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logging.format".to_string(),
                message: format!(
                    "Invalid log format: {}. Valid formats: {:?}",
                    config.logging.format, VALID_LOG_FORMATS
                ),
            });
        }

        Ok(())
    }

    /// Get default configuration
    pub fn default() -> Config {
        Config::default()
    }

    /// Create example configuration file
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let yaml_content =
            serde_yaml::to_string(&config).context("Failed to serialize default configuration")?;

        std::fs::write(path.as_ref(), yaml_content).context("Failed to write example configuration file")?;

        Ok(())
    }
}
