// The catalog of typed queries behind the analytics dashboard.
//
// Each method builds one fixed `ReportQuery`, hands it to the executor and
// shapes the rows. Nothing is cached here and no error is swallowed: a failed
// token exchange or report call comes back to the caller as-is, and the
// dashboard layer decides what placeholder to show instead.

use super::analytics_error::AnalyticsError;
use super::analytics_models::{
    AnalyticsData, BreakdownEntry, DateRange, MinuteActivity, OrderBy, ReportQuery, ReportResult,
    TimeSeriesPoint,
};
use super::analytics_ports::ReportExecutor;
use super::report_shaping::{
    first_count, parse_count, parse_rate, shape_breakdown, shape_metrics, shape_minute_timeline,
    shape_time_series, sum_minute_window,
};
use chrono::{Local, Timelike};

// ============================================================================
// QUERY DEFAULTS
// ============================================================================

pub const DEFAULT_OVERVIEW_DAYS: u32 = 30;
pub const DEFAULT_SERIES_DAYS: u32 = 7;
pub const BREAKDOWN_WINDOW_DAYS: u32 = 30;
pub const DEFAULT_TOP_PAGES: u32 = 5;
pub const DEFAULT_LOCATION_LIMIT: u32 = 10;
pub const REALTIME_WINDOW_MINUTES: u32 = 30;

/// Metrics requested for the overview, in display order.
pub const OVERVIEW_METRICS: [&str; 9] = [
    "activeUsers",
    "screenPageViews",
    "sessions",
    "userEngagementDuration",
    "bounceRate",
    "engagedSessions",
    "totalUsers",
    "sessionsPerUser",
    "newUsers",
];

const UNKNOWN_LOCATION: &str = "Unknown";

pub struct AnalyticsService<E: ReportExecutor> {
    executor: E,
}

impl<E: ReportExecutor> AnalyticsService<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Runs an arbitrary query without shaping. Used by diagnostics.
    pub async fn raw_report(&self, query: &ReportQuery) -> Result<ReportResult, AnalyticsError> {
        self.executor.run_report(query).await
    }

    // ------------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------------

    /// Site-wide totals for `range` (see [`OVERVIEW_METRICS`]).
    pub async fn metrics_overview(&self, range: DateRange) -> Result<AnalyticsData, AnalyticsError> {
        tracing::debug!(
            "Fetching overview metrics from {} to {}",
            range.start_date,
            range.end_date
        );

        let query = ReportQuery::new(range.clone()).metrics(OVERVIEW_METRICS);
        let result = self.executor.run_report(&query).await?;

        if result.rows.is_empty() {
            tracing::info!(
                "No overview data for {}..{} (new property or no traffic)",
                range.start_date,
                range.end_date
            );
        }

        Ok(AnalyticsData {
            start_date: range.start_date,
            end_date: range.end_date,
            metrics: shape_metrics(&result),
        })
    }

    pub async fn event_count(&self, days: u32) -> Result<u64, AnalyticsError> {
        self.single_total(DateRange::last_n_days(days), "eventCount")
            .await
    }

    /// Key (conversion) events over the last `days`.
    pub async fn key_events_count(&self, days: u32) -> Result<u64, AnalyticsError> {
        self.single_total(DateRange::last_n_days(days), "conversions")
            .await
    }

    pub async fn new_users(&self, days: u32) -> Result<u64, AnalyticsError> {
        self.single_total(DateRange::last_n_days(days), "newUsers")
            .await
    }

    async fn single_total(&self, range: DateRange, metric: &str) -> Result<u64, AnalyticsError> {
        let query = ReportQuery::new(range).metric(metric);
        let result = self.executor.run_report(&query).await?;
        Ok(first_count(&result))
    }

    // ------------------------------------------------------------------------
    // Time series
    // ------------------------------------------------------------------------

    pub async fn page_views_over_time(
        &self,
        days: u32,
    ) -> Result<Vec<TimeSeriesPoint<u64>>, AnalyticsError> {
        let result = self
            .executor
            .run_report(&Self::daily_query(days, "screenPageViews"))
            .await?;
        Ok(shape_time_series(&result, parse_count))
    }

    pub async fn bounce_rate_over_time(
        &self,
        days: u32,
    ) -> Result<Vec<TimeSeriesPoint<f64>>, AnalyticsError> {
        let result = self
            .executor
            .run_report(&Self::daily_query(days, "bounceRate"))
            .await?;
        Ok(shape_time_series(&result, parse_rate))
    }

    fn daily_query(days: u32, metric: &str) -> ReportQuery {
        ReportQuery::new(DateRange::last_n_days(days))
            .dimension("date")
            .metric(metric)
            .order_by(OrderBy::dimension("date", false))
    }

    // ------------------------------------------------------------------------
    // Top-N breakdowns
    // ------------------------------------------------------------------------

    pub async fn top_pages(&self, limit: u32) -> Result<Vec<BreakdownEntry>, AnalyticsError> {
        self.breakdown("pagePath", "screenPageViews", Some(limit), "")
            .await
    }

    /// Active users per device category. No row limit: there are only a
    /// handful of categories.
    pub async fn device_categories(&self) -> Result<Vec<BreakdownEntry>, AnalyticsError> {
        self.breakdown("deviceCategory", "activeUsers", None, "")
            .await
    }

    pub async fn users_by_country(&self, limit: u32) -> Result<Vec<BreakdownEntry>, AnalyticsError> {
        self.breakdown("country", "activeUsers", Some(limit), UNKNOWN_LOCATION)
            .await
    }

    pub async fn users_by_city(&self, limit: u32) -> Result<Vec<BreakdownEntry>, AnalyticsError> {
        self.breakdown("city", "activeUsers", Some(limit), UNKNOWN_LOCATION)
            .await
    }

    async fn breakdown(
        &self,
        dimension: &str,
        metric: &str,
        limit: Option<u32>,
        missing_label: &str,
    ) -> Result<Vec<BreakdownEntry>, AnalyticsError> {
        let mut query = ReportQuery::new(DateRange::last_n_days(BREAKDOWN_WINDOW_DAYS))
            .dimension(dimension)
            .metric(metric)
            .order_by(OrderBy::metric(metric, true));
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let result = self.executor.run_report(&query).await?;
        Ok(shape_breakdown(&result, missing_label))
    }

    // ------------------------------------------------------------------------
    // Realtime
    // ------------------------------------------------------------------------

    /// Active users over the last 30 minutes. An empty per-minute report
    /// means nobody is on the site, so this is 0 rather than today's total.
    pub async fn active_users(&self) -> Result<u64, AnalyticsError> {
        self.minute_window_total(REALTIME_WINDOW_MINUTES, false)
            .await
    }

    /// Active users whose `minute` bucket falls within the trailing window.
    ///
    /// When today's per-minute report is empty we fall back to a single
    /// dimensionless total for today.
    pub async fn active_users_in_last_minutes(&self, minutes: u32) -> Result<u64, AnalyticsError> {
        self.minute_window_total(minutes, true).await
    }

    async fn minute_window_total(
        &self,
        minutes: u32,
        fall_back_to_daily_total: bool,
    ) -> Result<u64, AnalyticsError> {
        let result = self.executor.run_report(&Self::minute_query()).await?;

        if result.rows.is_empty() {
            if !fall_back_to_daily_total {
                return Ok(0);
            }
            tracing::debug!(
                "No minute data, falling back to today's total for the last {} minutes",
                minutes
            );
            let fallback = ReportQuery::new(DateRange::today())
                .metric("activeUsers")
                .keep_empty_rows();
            let result = self.executor.run_report(&fallback).await?;
            return Ok(first_count(&result));
        }

        let current_minute = Local::now().minute();
        let active = sum_minute_window(&result, current_minute, minutes);
        tracing::debug!("Active users in last {} minutes: {}", minutes, active);
        Ok(active)
    }

    /// Per-minute active users for the last 30 minutes, oldest first.
    pub async fn active_users_per_minute(&self) -> Result<Vec<MinuteActivity>, AnalyticsError> {
        let result = self.executor.run_report(&Self::minute_query()).await?;
        Ok(shape_minute_timeline(&result, Local::now().naive_local()))
    }

    fn minute_query() -> ReportQuery {
        ReportQuery::new(DateRange::today())
            .dimension("minute")
            .metric("activeUsers")
    }
}
