// =============================================================================
// SERVICE ACCOUNT TOKEN CACHE
// =============================================================================
//
// Holds the one access token the process uses for the Data API.
//
// States:
// - empty: nothing cached yet (process start, or every exchange so far failed)
// - valid: `expires_at - now > 300`, served without a network call
// - stale: within five minutes of expiry (or past it), refreshed on next use
//
// The cache sits behind a `tokio::sync::Mutex` that is held across the
// refresh, so concurrent callers that miss at the same time wait for a single
// exchange instead of each running their own.

use super::analytics_settings::AnalyticsSettings;
use super::assertion_signer::sign_assertion;
use crate::core::analytics::{AnalyticsError, TokenProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

/// A cached token is only handed out while it has more than this left.
pub const REFRESH_MARGIN_SECS: i64 = 300;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[allow(dead_code)]
    #[serde(default)]
    token_type: Option<String>,
}

/// Cached access token with its absolute expiry (epoch seconds).
#[derive(Debug, Clone, PartialEq)]
pub struct CachedToken {
    pub token: String,
    pub expires_at: i64,
}

impl CachedToken {
    pub fn is_usable_at(&self, now: i64) -> bool {
        self.expires_at - now > REFRESH_MARGIN_SECS
    }
}

/// Exchanges service account assertions for access tokens and caches them.
pub struct ServiceAccountTokenProvider {
    settings: AnalyticsSettings,
    client: Client,
    cached_token: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    pub fn new(settings: AnalyticsSettings) -> Result<Self, AnalyticsError> {
        let client = settings.http_client()?;
        Ok(Self {
            settings,
            client,
            cached_token: Mutex::new(None),
        })
    }

    /// The currently cached entry, if any. Does not refresh.
    pub async fn cached_token(&self) -> Option<CachedToken> {
        self.cached_token.lock().await.clone()
    }

    #[cfg(test)]
    async fn seed(&self, token: CachedToken) {
        *self.cached_token.lock().await = Some(token);
    }

    /// Signs a new assertion and trades it for an access token.
    async fn exchange(&self) -> Result<CachedToken, AnalyticsError> {
        let assertion = sign_assertion(&self.settings, now_secs())?;

        let response = self
            .client
            .post(&self.settings.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AnalyticsError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Token exchange failed ({}): {}", status, body);
            return Err(AnalyticsError::TokenExchange {
                status: status.as_u16(),
                body,
            });
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AnalyticsError::Decode(format!("token response: {}", e)))?;

        let expires_in = token_response
            .expires_in
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        Ok(CachedToken {
            token: token_response.access_token,
            expires_at: now_secs() + expires_in,
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String, AnalyticsError> {
        let mut cached = self.cached_token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_usable_at(now_secs()) {
                return Ok(token.token.clone());
            }
        }

        // A failed exchange returns early and leaves the old entry in place.
        let fresh = self.exchange().await?;
        tracing::info!(
            "Refreshed Google access token (valid for {}s)",
            fresh.expires_at - now_secs()
        );

        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
