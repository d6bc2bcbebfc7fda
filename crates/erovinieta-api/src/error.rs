use thiserror::Error;

/// Top-level error type for the `erovinieta-api` crate.
///
/// The portal only ever fails in two ways that callers care about: the
/// login round-trip is rejected, or a data request still fails after the
/// client has done its single re-authentication retry. Everything else is
/// local setup (bad URL, HTTP client construction).
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed: transport error, non-200 status, or no session cookie.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Requests ────────────────────────────────────────────────────
    /// A data request failed after the bounded re-authentication retry.
    ///
    /// `status` is `None` when the request never produced an HTTP response
    /// (connection refused, timeout); `body` then carries the transport error.
    #[error("{}", api_request_message(*status, body))]
    ApiRequest { status: Option<u16>, body: String },

    // ── Setup ───────────────────────────────────────────────────────
    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

fn api_request_message(status: Option<u16>, body: &str) -> String {
    let preview = body_preview(body);
    match status {
        Some(code) => format!("API request failed (HTTP {code}): {preview}"),
        None => format!("API request failed: {preview}"),
    }
}

/// First 200 bytes of a response body, cut on a UTF-8 boundary.
pub(crate) fn body_preview(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body;
    }
    let end = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
    &body[..end]
}

impl Error {
    /// Returns `true` if the portal rejected our credentials or session.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::ApiRequest { status, .. } => matches!(status, Some(401 | 403)),
            _ => false,
        }
    }

    /// Extract the HTTP status code, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiRequest { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_request_message_truncates_long_bodies() {
        let err = Error::ApiRequest {
            status: Some(500),
            body: "x".repeat(1_000),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("API request failed (HTTP 500): "));
        assert!(msg.len() < 260);
    }

    #[test]
    fn api_request_message_respects_utf8_boundaries() {
        let body = "ă".repeat(150);
        let err = Error::ApiRequest { status: None, body };
        // Must not panic on a multi-byte boundary.
        assert!(err.to_string().starts_with("API request failed: "));
    }

    #[test]
    fn auth_classification() {
        assert!(
            Error::Authentication {
                message: "nope".into()
            }
            .is_auth_error()
        );
        assert!(
            Error::ApiRequest {
                status: Some(403),
                body: String::new()
            }
            .is_auth_error()
        );
        let transport = Error::ApiRequest {
            status: None,
            body: "connection refused".into(),
        };
        assert!(!transport.is_auth_error());
        assert_eq!(transport.status(), None);
    }
}
