// ── Core error types ──
//
// User-facing errors from erovinieta-core. Consumers never see raw HTTP
// bodies; the `From<erovinieta_api::Error>` impl folds transport-layer
// failures into domain-level variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code, when the portal answered at all.
        status: Option<u16>,
    },

    // ── Poll cycle errors ────────────────────────────────────────────
    /// A poll cycle failed as a whole; the previous snapshot stays published.
    #[error("Update failed: {message}")]
    UpdateFailed { message: String },

    /// The coordinator was shut down while a cycle was in flight.
    #[error("Poll cycle abandoned: coordinator is shutting down")]
    Cancelled,

    /// No snapshot has been published yet.
    #[error("Integration is not set up: no snapshot has been published")]
    NotSetUp,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` for credential or session rejections.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
            || matches!(self, Self::Api { status: Some(401 | 403), .. })
    }

    /// Returns `true` when the portal could not be reached at all.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Api { status: None, .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<erovinieta_api::Error> for CoreError {
    fn from(err: erovinieta_api::Error) -> Self {
        match err {
            erovinieta_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            e @ erovinieta_api::Error::ApiRequest { .. } => CoreError::Api {
                status: e.status(),
                message: e.to_string(),
            },
            erovinieta_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid portal URL: {e}"),
            },
            erovinieta_api::Error::Client(message) => CoreError::Config { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_auth_error_maps_to_authentication_failed() {
        let err: CoreError = erovinieta_api::Error::Authentication {
            message: "bad credentials".into(),
        }
        .into();
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
        assert!(err.is_auth_error());
    }

    #[test]
    fn transport_failure_is_a_connection_error() {
        let err: CoreError = erovinieta_api::Error::ApiRequest {
            status: None,
            body: "connection refused".into(),
        }
        .into();
        assert!(err.is_connection_error());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn forbidden_request_counts_as_auth_error() {
        let err: CoreError = erovinieta_api::Error::ApiRequest {
            status: Some(403),
            body: String::new(),
        }
        .into();
        assert!(err.is_auth_error());
        assert!(!err.is_connection_error());
    }
}
