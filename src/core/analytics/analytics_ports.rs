use super::analytics_error::AnalyticsError;
use super::analytics_models::{ReportQuery, ReportResult};
use async_trait::async_trait;
use std::sync::Arc;

// ============================================================================
// PORTS
// ============================================================================
// The core only knows that it can get a bearer token and run a report.
// The infra layer decides how (service-account JWTs, the Data API over HTTP);
// tests plug in fakes.

/// Source of a currently-valid bearer token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a token that is safe to present right now, refreshing it first
    /// if the cached one is missing or about to expire.
    async fn access_token(&self) -> Result<String, AnalyticsError>;
}

/// Runs one report query and hands back the raw result.
#[async_trait]
pub trait ReportExecutor: Send + Sync {
    async fn run_report(&self, query: &ReportQuery) -> Result<ReportResult, AnalyticsError>;
}

// Shared handles: lets one token cache back several clients.
#[async_trait]
impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    async fn access_token(&self) -> Result<String, AnalyticsError> {
        (**self).access_token().await
    }
}

#[async_trait]
impl<E: ReportExecutor + ?Sized> ReportExecutor for Arc<E> {
    async fn run_report(&self, query: &ReportQuery) -> Result<ReportResult, AnalyticsError> {
        (**self).run_report(query).await
    }
}
