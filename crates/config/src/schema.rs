//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use types::RelayEndpoint;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Relay data APIs to query
    pub relays: Vec<RelayConfig>,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Relay name
    pub name: String,
    /// Base address, optionally `https://0x<pubkey>@host`
    pub address: String,
    /// Whether this relay is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Static headers sent with every request
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Full filter directive, taken from `RUST_LOG` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Convert relay configs to endpoint descriptions
    pub fn to_relay_endpoints(&self) -> Vec<RelayEndpoint> {
        self.relays.iter().map(RelayConfig::to_endpoint).collect()
    }

    /// Endpoint description of an enabled relay, looked up by name
    pub fn relay_endpoint(&self, name: &str) -> Option<RelayEndpoint> {
        self.relays
            .iter()
            .find(|relay| relay.enabled && relay.name == name)
            .map(RelayConfig::to_endpoint)
    }
}

impl RelayConfig {
    pub fn to_endpoint(&self) -> RelayEndpoint {
        RelayEndpoint {
            name: self.name.clone(),
            address: self.address.clone(),
            enabled: self.enabled,
            timeout: Duration::from_secs(self.timeout_seconds),
            extra_headers: self.extra_headers.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relays: vec![RelayConfig {
                name: "flashbots".to_string(),
                address: "https://boost-relay.flashbots.net".to_string(),
                enabled: true,
                timeout_seconds: default_timeout_seconds(),
                extra_headers: BTreeMap::new(),
            }],
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            filter: None,
        }
    }
}
