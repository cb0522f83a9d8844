// =============================================================================
// GOOGLE ANALYTICS MODULE
// =============================================================================
//
// Talks to the Google Analytics Data API on behalf of a service account.
//
// **Flow:**
// 1. `assertion_signer` signs a one-hour RS256 JWT with the service account key
// 2. `token_cache` exchanges it at the OAuth token endpoint and keeps the
//    access token until it is five minutes from expiry
// 3. `report_client` POSTs `runReport` queries with that bearer token
//
// **Setup:**
// - Create a service account and grant it "Viewer" on the GA4 property
// - Set `GOOGLE_CLIENT_EMAIL`, `GOOGLE_PRIVATE_KEY` and `GA_PROPERTY_ID`
//   (or point `GOOGLE_SERVICE_ACCOUNT_KEY` at the downloaded JSON key)

pub mod analytics_settings;
pub mod assertion_signer;
pub mod report_client;
pub mod token_cache;

pub use analytics_settings::AnalyticsSettings;
pub use assertion_signer::{sign_assertion, SignedAssertion};
pub use report_client::GoogleAnalyticsClient;
pub use token_cache::{CachedToken, ServiceAccountTokenProvider};

#[cfg(test)]
pub(crate) mod test_support {
    use super::AnalyticsSettings;
    use std::time::Duration;

    pub const TEST_PRIVATE_KEY: &str =
        include_str!("../../../tests/fixtures/service_account_key.pem");
    pub const TEST_PUBLIC_KEY: &str =
        include_str!("../../../tests/fixtures/service_account_key.pub.pem");
    pub const TEST_CLIENT_EMAIL: &str = "dashboard@portfolio-test.iam.gserviceaccount.com";

    /// Fully configured settings pointing both endpoints at `server_uri`.
    pub fn settings_for(server_uri: &str) -> AnalyticsSettings {
        AnalyticsSettings {
            client_email: Some(TEST_CLIENT_EMAIL.to_string()),
            private_key: Some(TEST_PRIVATE_KEY.to_string()),
            property_id: Some("123456".to_string()),
            token_uri: format!("{}/token", server_uri),
            reporting_base_url: server_uri.to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }
}
