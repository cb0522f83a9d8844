// =============================================================================
// ANALYTICS SETTINGS
// =============================================================================
//
// **Environment Variables:**
// - `GOOGLE_CLIENT_EMAIL` - Service account email (JWT issuer and subject)
// - `GOOGLE_PRIVATE_KEY` - PEM private key; `\n` escapes are turned into newlines
// - `GA_PROPERTY_ID` - Numeric GA4 property id
// - `GOOGLE_SERVICE_ACCOUNT_KEY` - Path to the service account JSON key (fallback)
// - `GOOGLE_SERVICE_ACCOUNT_JSON` - The JSON key content directly (fallback)
// - `GA_REQUEST_TIMEOUT_SECS` - Per-request timeout, default 30
//
// Missing values are not an error here. The signer and the report client
// fail with `AnalyticsError::Configuration` when they actually need them, and
// callers can check `is_configured()` up front.

use crate::core::analytics::AnalyticsError;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const ANALYTICS_DATA_BASE_URL: &str = "https://analyticsdata.googleapis.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// The parts of a downloaded service account key we care about.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountKeyFile {
    client_email: Option<String>,
    private_key: Option<String>,
    token_uri: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnalyticsSettings {
    pub client_email: Option<String>,
    pub private_key: Option<String>,
    pub property_id: Option<String>,
    /// OAuth token endpoint; also the JWT audience.
    pub token_uri: String,
    pub reporting_base_url: String,
    pub request_timeout: Duration,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            client_email: None,
            private_key: None,
            property_id: None,
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            reporting_base_url: ANALYTICS_DATA_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AnalyticsSettings {
    /// Reads settings from the process environment.
    pub async fn from_env() -> Result<Self, AnalyticsError> {
        Self::from_lookup(|name| std::env::var(name).ok()).await
    }

    /// Builds settings from any variable source (`lookup` returns the raw
    /// value of a variable by name).
    ///
    /// Only an unreadable or unparseable key file is an error; absent
    /// variables just leave the corresponding field empty.
    pub async fn from_lookup<F>(lookup: F) -> Result<Self, AnalyticsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut settings = Self {
            client_email: var("GOOGLE_CLIENT_EMAIL"),
            private_key: var("GOOGLE_PRIVATE_KEY").map(|key| normalize_private_key(&key)),
            property_id: var("GA_PROPERTY_ID"),
            request_timeout: parse_timeout(var("GA_REQUEST_TIMEOUT_SECS").as_deref()),
            ..Self::default()
        };

        if settings.client_email.is_none() || settings.private_key.is_none() {
            if let Some(path) = var("GOOGLE_SERVICE_ACCOUNT_KEY") {
                let json = tokio::fs::read_to_string(&path).await.map_err(|e| {
                    AnalyticsError::Configuration(format!(
                        "cannot read service account key {}: {}",
                        path, e
                    ))
                })?;
                settings.apply_key_json(&json)?;
            } else if let Some(json) = var("GOOGLE_SERVICE_ACCOUNT_JSON") {
                settings.apply_key_json(&json)?;
            }
        }

        Ok(settings)
    }

    /// Fills identity and key from a service account JSON key, without
    /// overriding values that are already set.
    pub fn apply_key_json(&mut self, json: &str) -> Result<(), AnalyticsError> {
        let key: ServiceAccountKeyFile = serde_json::from_str(json).map_err(|e| {
            AnalyticsError::Configuration(format!("invalid service account JSON: {}", e))
        })?;

        if self.client_email.is_none() {
            self.client_email = key.client_email;
        }
        if self.private_key.is_none() {
            self.private_key = key.private_key.map(|k| normalize_private_key(&k));
        }
        if let Some(token_uri) = key.token_uri {
            self.token_uri = token_uri;
        }
        Ok(())
    }

    /// True when identity, key and property id are all present.
    pub fn is_configured(&self) -> bool {
        self.client_email.is_some() && self.private_key.is_some() && self.property_id.is_some()
    }

    /// HTTP client with the configured timeout applied to every request.
    pub fn http_client(&self) -> Result<Client, AnalyticsError> {
        Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| AnalyticsError::Configuration(format!("cannot build HTTP client: {}", e)))
    }
}

/// Keys pasted into a single-line env var carry literal `\n` sequences.
pub fn normalize_private_key(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

/// Positive whole seconds, or the default for anything else.
fn parse_timeout(raw: Option<&str>) -> Duration {
    let Some(raw) = raw else {
        return Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS);
    };

    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            tracing::warn!(
                "Ignoring invalid GA_REQUEST_TIMEOUT_SECS={}, using {}s",
                raw,
                DEFAULT_REQUEST_TIMEOUT_SECS
            );
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        }
    }
}
