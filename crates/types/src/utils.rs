//! Utility functions and helpers

/// Remove CR and LF bytes from a response body for single-line diagnostics
pub fn strip_line_breaks(body: &[u8]) -> String {
    let kept: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| *b != b'\n' && *b != b'\r')
        .collect();
    String::from_utf8_lossy(&kept).into_owned()
}

/// Generate a short correlation ID for request tracing
pub fn generate_request_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    hex::encode(&uuid.as_bytes()[..4])
}

/// Sanitize string for logging (abbreviate long hex values)
pub fn sanitize_for_logging(s: &str) -> String {
    if s.len() <= 10 {
        return s.to_string();
    }

    // Show first 6 and last 4 characters for hashes and keys
    if s.starts_with("0x") && s.len() > 20 {
        format!("{}...{}", &s[..6], &s[s.len() - 4..])
    } else {
        // For other strings, show first 10 characters
        let end = s.char_indices().nth(10).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
