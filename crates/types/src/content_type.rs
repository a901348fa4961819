//! Content types negotiated with relays

use crate::error::ContentTypeError;
use std::fmt;

/// Encoding of a relay response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    /// Content type could not be established
    #[default]
    Unknown,
    /// SSZ encoded body
    Ssz,
    /// JSON encoded body
    Json,
}

impl ContentType {
    /// Media type string as sent on the wire
    pub fn media_type(&self) -> &'static str {
        match self {
            ContentType::Unknown => "unknown",
            ContentType::Ssz => "application/octet-stream",
            ContentType::Json => "application/json",
        }
    }

    /// Parse a `Content-Type` header value, ignoring any parameters
    pub fn from_media_type(value: &str) -> Result<Self, ContentTypeError> {
        let media_type = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match media_type.as_str() {
            "application/json" => Ok(ContentType::Json),
            "application/octet-stream" => Ok(ContentType::Ssz),
            "" => Err(ContentTypeError::Missing),
            _ => Err(ContentTypeError::Unsupported(value.to_string())),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_type())
    }
}
