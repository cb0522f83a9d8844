use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================
// One error type for the whole reporting pipeline. Every variant propagates
// unchanged from the signer up through the typed query functions; deciding
// what to show instead is the caller's job.

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Missing or unusable configuration: identity, key, property id, key
    /// file, or the HTTP client built from the settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The assertion could not be signed (usually a malformed PEM key).
    #[error("Failed to sign assertion: {0}")]
    Signing(String),

    #[error("Token exchange failed ({status}): {body}")]
    TokenExchange { status: u16, body: String },

    #[error("Analytics API error ({status}): {body}")]
    ReportQuery { status: u16, body: String },

    /// The request never produced a response (connect failure, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A 2xx response whose body was not the JSON we expected.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl AnalyticsError {
    /// HTTP status carried by the remote-endpoint variants.
    pub fn status(&self) -> Option<u16> {
        match self {
            AnalyticsError::TokenExchange { status, .. }
            | AnalyticsError::ReportQuery { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_for_remote_errors() {
        let exchange = AnalyticsError::TokenExchange {
            status: 400,
            body: "{}".to_string(),
        };
        let query = AnalyticsError::ReportQuery {
            status: 403,
            body: "{}".to_string(),
        };

        assert_eq!(exchange.status(), Some(400));
        assert_eq!(query.status(), Some(403));
        assert_eq!(
            AnalyticsError::Configuration("GA_PROPERTY_ID".to_string()).status(),
            None
        );
    }

    #[test]
    fn test_display_includes_status_and_body() {
        let err = AnalyticsError::ReportQuery {
            status: 403,
            body: "PERMISSION_DENIED".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Analytics API error (403): PERMISSION_DENIED"
        );
    }

    #[test]
    fn test_configuration_display_is_neutral() {
        let err = AnalyticsError::Configuration(
            "invalid service account JSON: expected value".to_string(),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: invalid service account JSON: expected value"
        );
    }
}
