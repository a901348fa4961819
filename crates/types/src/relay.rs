//! Relay endpoint description

use std::collections::BTreeMap;
use std::time::Duration;

/// A relay data API the client talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEndpoint {
    /// Unique name for the relay
    pub name: String,
    /// Base address, optionally carrying the relay public key as user info
    pub address: String,
    /// Whether this relay is enabled
    pub enabled: bool,
    /// Bound on a whole request, body included
    pub timeout: Duration,
    /// Static headers sent with every request
    pub extra_headers: BTreeMap<String, String>,
}

impl RelayEndpoint {
    /// Create an enabled endpoint with default timeout and no extra headers
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    /// Add a static header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for RelayEndpoint {
    fn default() -> Self {
        Self {
            name: "unknown".to_string(),
            address: "https://relay.example.com".to_string(),
            enabled: true,
            timeout: Duration::from_secs(10),
            extra_headers: BTreeMap::new(),
        }
    }
}
