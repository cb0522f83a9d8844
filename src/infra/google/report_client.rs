use super::analytics_settings::AnalyticsSettings;
use crate::core::analytics::{
    AnalyticsError, ReportExecutor, ReportQuery, ReportResult, TokenProvider,
};
use async_trait::async_trait;
use reqwest::Client;

/// Google Analytics Data API client. One `runReport` call per query, no
/// retries; the bearer token comes from whatever `TokenProvider` it is given.
pub struct GoogleAnalyticsClient<T: TokenProvider> {
    client: Client,
    tokens: T,
    property_id: Option<String>,
    base_url: String,
}

impl<T: TokenProvider> GoogleAnalyticsClient<T> {
    pub fn new(settings: &AnalyticsSettings, tokens: T) -> Result<Self, AnalyticsError> {
        Ok(Self {
            client: settings.http_client()?,
            tokens,
            property_id: settings.property_id.clone(),
            base_url: settings.reporting_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn report_url(&self, property_id: &str) -> String {
        format!(
            "{}/v1beta/properties/{}:runReport",
            self.base_url, property_id
        )
    }
}

#[async_trait]
impl<T: TokenProvider> ReportExecutor for GoogleAnalyticsClient<T> {
    async fn run_report(&self, query: &ReportQuery) -> Result<ReportResult, AnalyticsError> {
        let property_id = self
            .property_id
            .as_deref()
            .ok_or_else(|| AnalyticsError::Configuration("GA_PROPERTY_ID is not set".to_string()))?;

        let token = self.tokens.access_token().await?;
        let url = self.report_url(property_id);

        tracing::debug!(
            "Analytics API request: url={} property={} body={}",
            url,
            property_id,
            serde_json::to_string(query).unwrap_or_default()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(query)
            .send()
            .await
            .map_err(|e| AnalyticsError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                "Google Analytics API error for property {} ({}): {}",
                property_id,
                status,
                body
            );
            return Err(AnalyticsError::ReportQuery {
                status: status.as_u16(),
                body,
            });
        }

        let result: ReportResult = response
            .json()
            .await
            .map_err(|e| AnalyticsError::Decode(format!("runReport response: {}", e)))?;

        if result.rows.is_empty() {
            tracing::info!(
                "No rows from Google Analytics for property {} (normal for new properties or quiet ranges)",
                property_id
            );
        } else {
            tracing::debug!(
                "Analytics API response: {} row(s), metrics={:?}",
                result.rows.len(),
                result
                    .metric_headers
                    .iter()
                    .filter_map(|h| h.name.as_deref())
                    .collect::<Vec<_>>()
            );
        }

        Ok(result)
    }
}
