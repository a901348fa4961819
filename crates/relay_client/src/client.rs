//! HTTP transport for a single relay

use crate::monitor::{NoopMonitor, OperationMonitor};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, field, trace, Instrument, Span};
use types::error::RelayError;
use types::utils::{generate_request_id, sanitize_for_logging, strip_line_breaks};
use types::{BlsPublicKey, ContentType, ContentTypeError, RelayEndpoint, Result};

/// Prefer SSZ, accept JSON
pub const ACCEPT_HEADER: &str = "application/octet-stream;q=1,application/json;q=0.9";

/// A successful response body together with its detected encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub content_type: ContentType,
    pub body: Vec<u8>,
}

impl RelayResponse {
    /// Readable view over the body bytes
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(self.body.as_slice())
    }
}

/// HTTP client for a single relay
#[derive(Debug, Clone)]
pub struct RelayClient {
    name: String,
    address: String,
    base: String,
    timeout: Duration,
    headers: HeaderMap,
    pubkey: Option<BlsPublicKey>,
    http_client: Client,
    pub(crate) monitor: Arc<dyn OperationMonitor>,
}

impl RelayClient {
    /// Create a new relay client
    pub fn new(relay: RelayEndpoint) -> Result<Self> {
        let url = Url::parse(&relay.address).map_err(|e| {
            RelayError::InvalidConfiguration(format!("invalid address for relay {}: {}", relay.name, e))
        })?;

        let timeout = relay.timeout;
        if timeout.is_zero() {
            return Err(RelayError::InvalidConfiguration(format!(
                "timeout for relay {} must be greater than zero",
                relay.name
            )));
        }

        let mut headers = HeaderMap::with_capacity(relay.extra_headers.len() + 1);
        for (name, value) in &relay.extra_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                RelayError::InvalidConfiguration(format!("invalid header name {name}: {e}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                RelayError::InvalidConfiguration(format!("invalid value for header {name}: {e}"))
            })?;
            headers.append(header_name, header_value);
        }
        // Replaces any configured Accept header.
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HEADER));

        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("relay-data-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayError::InvalidConfiguration(format!("failed to create HTTP client: {e}")))?;

        let pubkey = pubkey_from_url(&url);
        match &pubkey {
            Some(key) => {
                let key = format!("0x{}", hex::encode(key));
                debug!(relay = %relay.name, pubkey = %sanitize_for_logging(&key), "Relay public key configured");
            }
            None if !url.username().is_empty() => {
                debug!(relay = %relay.name, "Relay address user info is not a public key");
            }
            None => {}
        }

        let base = url.as_str();
        let base = base.strip_suffix('/').unwrap_or(base).to_string();

        Ok(Self {
            name: relay.name,
            address: relay.address,
            base,
            timeout,
            headers,
            pubkey,
            http_client,
            monitor: Arc::new(NoopMonitor),
        })
    }

    /// Report completed operations to the given monitor
    pub fn with_monitor(mut self, monitor: Arc<dyn OperationMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Configured relay name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Relay address as configured
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Relay public key taken from the address user info
    pub fn pubkey(&self) -> Option<&BlsPublicKey> {
        self.pubkey.as_ref()
    }

    /// Issue a GET against `endpoint`, a path with optional query string
    ///
    /// Returns `Ok(None)` when the relay answers 404 or 204.
    pub async fn get(&self, endpoint: &str) -> Result<Option<RelayResponse>> {
        let url = Url::parse(&format!("{}{}", self.base, endpoint)).map_err(|e| RelayError::InvalidEndpoint {
            relay: self.name.clone(),
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        let span = tracing::debug_span!(
            "relay.get",
            relay = %self.name,
            request_id = %generate_request_id(),
            url = %url,
            status = field::Empty,
            size = field::Empty,
        );

        match timeout(self.timeout, self.execute(url)).instrument(span).await {
            Ok(result) => result,
            Err(_) => Err(RelayError::ConnectionTimeout {
                relay: self.name.clone(),
            }),
        }
    }

    async fn execute(&self, url: Url) -> Result<Option<RelayResponse>> {
        trace!("GET request");
        let response = self
            .http_client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let span = Span::current();
        span.record("status", status.as_u16());

        if status == StatusCode::NOT_FOUND {
            debug!("Endpoint not found");
            return Ok(None);
        }
        if status == StatusCode::NO_CONTENT {
            trace!("Endpoint returned no content");
            return Ok(None);
        }

        let detected = detect_content_type(response.headers());
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        span.record("size", body.len() as u64);

        if !status.is_success() {
            debug!(status = status.as_u16(), response = %strip_line_breaks(&body), "GET failed");
            return Err(RelayError::RequestFailed {
                relay: self.name.clone(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let content_type = detected.unwrap_or_else(|err| {
            debug!(error = %err, "Failed to obtain content type; assuming JSON");
            ContentType::Json
        });

        Ok(Some(RelayResponse {
            content_type,
            body: body.to_vec(),
        }))
    }

    fn transport_error(&self, err: reqwest::Error) -> RelayError {
        if err.is_timeout() {
            RelayError::ConnectionTimeout {
                relay: self.name.clone(),
            }
        } else {
            RelayError::Transport {
                relay: self.name.clone(),
                message: err.to_string(),
            }
        }
    }
}

/// Content type from exactly one `Content-Type` header value
fn detect_content_type(headers: &HeaderMap) -> std::result::Result<ContentType, ContentTypeError> {
    let values: Vec<&HeaderValue> = headers.get_all(CONTENT_TYPE).iter().collect();
    match values.as_slice() {
        [] => Err(ContentTypeError::Missing),
        [value] => {
            let text = value
                .to_str()
                .map_err(|_| ContentTypeError::Unsupported(String::from_utf8_lossy(value.as_bytes()).into_owned()))?;
            ContentType::from_media_type(text)
        }
        many => Err(ContentTypeError::Multiple(many.len())),
    }
}

/// Relay public key encoded as the user part of `https://0x<pubkey>@host`
fn pubkey_from_url(url: &Url) -> Option<BlsPublicKey> {
    let username = url.username();
    if username.is_empty() {
        return None;
    }
    let bytes = hex::decode(username.strip_prefix("0x").unwrap_or(username)).ok()?;
    BlsPublicKey::try_from(bytes.as_slice()).ok()
}
