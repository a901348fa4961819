//! Error types for the relay data client

use crate::content_type::ContentType;
use std::num::ParseIntError;
use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Tag identifying which class of codec failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input is not the expected JSON shape
    MalformedEnvelope,
    /// A required field is absent or empty
    FieldMissing,
    /// A field is present but its value does not parse
    InvalidValue,
    /// A byte field decoded to the wrong number of bytes
    IncorrectLength,
    /// A nested record failed to decode
    Nested,
}

/// Errors raised while decoding a relay record from canonical JSON
///
/// `Display` renders the same human message the relay tooling has always
/// produced, e.g. `slot missing` or `incorrect length for parent hash`.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Broken JSON, a non-object envelope or a field of the wrong JSON type
    #[error("invalid JSON: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    /// Required field absent, null or empty
    #[error("{field} missing")]
    FieldMissing { field: &'static str },

    /// Field present but not a valid value for its kind
    #[error("invalid value for {field}: {source}")]
    InvalidValue {
        field: &'static str,
        #[source]
        source: ValueError,
    },

    /// Byte field with the wrong decoded length
    #[error("incorrect length for {field}")]
    IncorrectLength { field: &'static str },

    /// Failure inside a nested record
    #[error("invalid JSON: {0}")]
    Nested(#[source] Box<CodecError>),
}

impl CodecError {
    /// Kind tag of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::MalformedEnvelope(_) => ErrorKind::MalformedEnvelope,
            CodecError::FieldMissing { .. } => ErrorKind::FieldMissing,
            CodecError::InvalidValue { .. } => ErrorKind::InvalidValue,
            CodecError::IncorrectLength { .. } => ErrorKind::IncorrectLength,
            CodecError::Nested(_) => ErrorKind::Nested,
        }
    }

    /// Human name of the offending field, if the error names one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            CodecError::FieldMissing { field }
            | CodecError::InvalidValue { field, .. }
            | CodecError::IncorrectLength { field } => Some(*field),
            CodecError::MalformedEnvelope(_) | CodecError::Nested(_) => None,
        }
    }

    /// Innermost error once nested wrappers are removed
    pub fn innermost(&self) -> &CodecError {
        match self {
            CodecError::Nested(inner) => inner.innermost(),
            other => other,
        }
    }
}

/// Underlying cause of an invalid field value
#[derive(Error, Debug)]
pub enum ValueError {
    /// Character outside `0-9` in a decimal field
    #[error("invalid digit {digit:?} at position {index}")]
    NotDecimal { digit: char, index: usize },

    /// Decimal digits that do not fit in 64 bits
    #[error("{0}")]
    Integer(#[from] ParseIntError),

    /// No digits at all
    #[error("cannot parse integer from empty string")]
    Empty,

    /// Malformed hex payload
    #[error("{0}")]
    Hex(#[from] hex::FromHexError),
}

/// Errors detecting the content type of a relay response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentTypeError {
    /// No `Content-Type` header at all
    #[error("no content type supplied in response")]
    Missing,

    /// More than one `Content-Type` header value
    #[error("malformed content type ({0} entries)")]
    Multiple(usize),

    /// Media type this client does not know
    #[error("unsupported content type {0}")]
    Unsupported(String),
}

/// Relay communication errors
#[derive(Error, Debug)]
pub enum RelayError {
    /// Base address and endpoint do not form a valid URL
    #[error("invalid endpoint {endpoint} for relay {relay}: {message}")]
    InvalidEndpoint {
        relay: String,
        endpoint: String,
        message: String,
    },

    /// Request did not complete within the configured timeout
    #[error("Connection timeout to relay: {relay}")]
    ConnectionTimeout { relay: String },

    /// Request could not be sent or its body could not be read
    #[error("failed to call GET endpoint on relay {relay}: {message}")]
    Transport { relay: String, message: String },

    /// Non-2xx status other than 404 and 204
    #[error("GET failed with status {status}: {body}")]
    RequestFailed {
        relay: String,
        status: u16,
        body: String,
    },

    /// Response in a content type the operation cannot decode
    #[error("unsupported content type {content_type} from relay {relay}")]
    UnsupportedContentType {
        relay: String,
        content_type: ContentType,
    },

    /// Relay answered with no content where content was required
    #[error("failed to obtain {operation} from relay {relay}")]
    NoResponse {
        relay: String,
        operation: &'static str,
    },

    /// Response body did not decode into the expected records
    #[error("failed to parse {operation}: {source}")]
    Decode {
        relay: String,
        operation: &'static str,
        #[source]
        source: CodecError,
    },

    /// Transport failure while serving a named operation
    #[error("failed to request {operation}: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: Box<RelayError>,
    },

    /// Client could not be built from its endpoint description
    #[error("Invalid relay configuration: {0}")]
    InvalidConfiguration(String),
}

impl RelayError {
    /// HTTP status carried by this error or the transport error it wraps
    pub fn status(&self) -> Option<u16> {
        match self {
            RelayError::RequestFailed { status, .. } => Some(*status),
            RelayError::Request { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Codec error carried by this error, if decoding failed
    pub fn codec_error(&self) -> Option<&CodecError> {
        match self {
            RelayError::Decode { source, .. } => Some(source),
            RelayError::Request { source, .. } => source.codec_error(),
            _ => None,
        }
    }
}

/// Configuration specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Validation error
    #[error("Configuration validation error: {field}: {message}")]
    ValidationError { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    /// Invalid value
    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl From<ConfigError> for RelayError {
    fn from(err: ConfigError) -> Self {
        RelayError::InvalidConfiguration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_rendering_and_innermost() {
        let inner = CodecError::FieldMissing { field: "message" };
        let err = CodecError::Nested(Box::new(inner));
        assert_eq!(err.to_string(), "invalid JSON: message missing");
        assert_eq!(err.kind(), ErrorKind::Nested);
        assert_eq!(err.innermost().kind(), ErrorKind::FieldMissing);
        assert_eq!(err.innermost().field(), Some("message"));
    }

    #[test]
    fn test_invalid_value_keeps_cause() {
        let err = CodecError::InvalidValue {
            field: "slot",
            source: ValueError::NotDecimal { digit: '-', index: 0 },
        };
        assert_eq!(err.to_string(), "invalid value for slot: invalid digit '-' at position 0");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_status_looks_through_request_wrapper() {
        let err = RelayError::Request {
            operation: "queued proposers",
            source: Box::new(RelayError::RequestFailed {
                relay: "test".to_string(),
                status: 500,
                body: "boom".to_string(),
            }),
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(
            err.to_string(),
            "failed to request queued proposers: GET failed with status 500: boom"
        );
    }
}
