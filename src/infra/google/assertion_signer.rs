use super::analytics_settings::AnalyticsSettings;
use crate::core::analytics::AnalyticsError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

/// Read-only access to GA4 reporting.
pub const ANALYTICS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";

/// Assertions live for one hour, the maximum Google accepts.
pub const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// JWT claims for the OAuth2 JWT-bearer grant.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    /// Issuer (service account email).
    iss: &'a str,

    /// Subject (the same account; we never impersonate a user).
    sub: &'a str,

    /// Audience (token endpoint).
    aud: &'a str,

    /// Issued at (Unix timestamp).
    iat: i64,

    /// Expiration (Unix timestamp, `iat` + 1 hour).
    exp: i64,

    scope: &'a str,
}

/// A signed assertion ready to be exchanged for an access token.
#[derive(Debug, Clone)]
pub struct SignedAssertion {
    pub token: String,
    pub expires_at: i64,
}

/// Signs a fresh assertion issued at `issued_at` (epoch seconds).
pub fn sign_assertion(
    settings: &AnalyticsSettings,
    issued_at: i64,
) -> Result<SignedAssertion, AnalyticsError> {
    let (Some(client_email), Some(private_key)) =
        (settings.client_email.as_deref(), settings.private_key.as_deref())
    else {
        return Err(AnalyticsError::Configuration(
            "missing required credentials (GOOGLE_CLIENT_EMAIL / GOOGLE_PRIVATE_KEY)".to_string(),
        ));
    };

    let expires_at = issued_at + ASSERTION_LIFETIME_SECS;
    let claims = AssertionClaims {
        iss: client_email,
        sub: client_email,
        aud: &settings.token_uri,
        iat: issued_at,
        exp: expires_at,
        scope: ANALYTICS_READONLY_SCOPE,
    };

    let key = EncodingKey::from_rsa_pem(private_key.as_bytes())
        .map_err(|e| AnalyticsError::Signing(e.to_string()))?;
    let token = encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| AnalyticsError::Signing(e.to_string()))?;

    Ok(SignedAssertion { token, expires_at })
}
