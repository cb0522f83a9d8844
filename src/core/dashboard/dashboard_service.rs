// The dashboard sits on top of the analytics service and never fails.
//
// Every view runs the matching typed query, formats it for display, and on
// any `AnalyticsError` logs a warning and returns zero-valued or empty
// placeholder data instead. A broken credential or a GA outage should make
// the charts empty, not take the page down.

use super::dashboard_models::{
    ChartPoint, DeviceSlice, DiagnosticsReport, EventTotals, LocationRow, OverviewStats,
    RealtimeSnapshot, ReportSummary, TopPageRow,
};
use super::formatting::{
    capitalize_first_letter, format_duration, format_page_path, format_percent,
    format_report_date, format_thousands, fraction_to_percent, round_one_decimal,
};
use crate::core::analytics::analytics_service::DEFAULT_OVERVIEW_DAYS;
use crate::core::analytics::report_shaping::{parse_count, parse_rate, total_count};
use crate::core::analytics::{
    AnalyticsError, AnalyticsService, BreakdownEntry, DateRange, ReportExecutor, ReportQuery,
    ReportResult,
};

pub struct DashboardService<E: ReportExecutor> {
    analytics: AnalyticsService<E>,
}

impl<E: ReportExecutor> DashboardService<E> {
    pub fn new(analytics: AnalyticsService<E>) -> Self {
        Self { analytics }
    }

    /// Headline cards for the last 30 days.
    pub async fn overview(&self) -> OverviewStats {
        let result = self
            .analytics
            .metrics_overview(DateRange::last_n_days(DEFAULT_OVERVIEW_DAYS))
            .await;

        let Some(data) = ok_or_warn(result, "overview") else {
            return OverviewStats::placeholder();
        };

        let visitors = parse_count(data.metric("activeUsers"));
        let pageviews = parse_count(data.metric("screenPageViews"));
        let engagement = parse_count(data.metric("userEngagementDuration"));
        let bounce_rate = parse_rate(data.metric("bounceRate"));

        OverviewStats::from_values(
            format_thousands(visitors),
            format_thousands(pageviews),
            format_duration(engagement),
            format_percent(fraction_to_percent(bounce_rate)),
        )
    }

    pub async fn page_views_chart(&self, days: u32) -> Vec<ChartPoint<u64>> {
        let result = self.analytics.page_views_over_time(days).await;

        ok_or_warn(result, "page views")
            .unwrap_or_default()
            .into_iter()
            .map(|point| ChartPoint {
                name: format_report_date(&point.date),
                value: point.value,
            })
            .collect()
    }

    /// Daily bounce rate as a percentage with one decimal.
    pub async fn bounce_rate_chart(&self, days: u32) -> Vec<ChartPoint<f64>> {
        let result = self.analytics.bounce_rate_over_time(days).await;

        ok_or_warn(result, "bounce rate")
            .unwrap_or_default()
            .into_iter()
            .map(|point| ChartPoint {
                name: format_report_date(&point.date),
                value: round_one_decimal(fraction_to_percent(point.value)),
            })
            .collect()
    }

    pub async fn top_pages_table(&self, limit: u32) -> Vec<TopPageRow> {
        let result = self.analytics.top_pages(limit).await;

        ok_or_warn(result, "top pages")
            .unwrap_or_default()
            .into_iter()
            .map(|entry| TopPageRow {
                name: format_page_path(&entry.dimension_value),
                visitors: entry.metric_value,
            })
            .collect()
    }

    pub async fn devices(&self) -> Vec<DeviceSlice> {
        let result = self.analytics.device_categories().await;

        let slices: Vec<DeviceSlice> = ok_or_warn(result, "devices")
            .unwrap_or_default()
            .into_iter()
            .map(|entry| DeviceSlice {
                name: capitalize_first_letter(&entry.dimension_value),
                value: entry.metric_value,
                device: entry.dimension_value.to_lowercase(),
            })
            .collect();

        if slices.is_empty() {
            tracing::info!("No device data found, using placeholder devices");
            return DeviceSlice::placeholder();
        }
        slices
    }

    /// Realtime panel. Queries run one after another to stay clear of the
    /// Data API's per-property concurrency quota.
    pub async fn realtime(&self) -> RealtimeSnapshot {
        let active_users = self.analytics.active_users().await;
        let last_5_min = self.analytics.active_users_in_last_minutes(5).await;
        let last_30_min = self.analytics.active_users_in_last_minutes(30).await;
        let new_users = self.analytics.new_users(1).await;
        let timeline = self.analytics.active_users_per_minute().await;

        let snapshot = RealtimeSnapshot {
            active_users: ok_or_warn(active_users, "active users").unwrap_or(0),
            new_users: ok_or_warn(new_users, "new users").unwrap_or(0),
            timeline: ok_or_warn(timeline, "active users timeline").unwrap_or_default(),
            last_30_min: ok_or_warn(last_30_min, "30-minute users").unwrap_or(0),
            last_5_min: ok_or_warn(last_5_min, "5-minute users").unwrap_or(0),
        };

        tracing::debug!(
            "Realtime: active={} last5={} last30={} new={} timeline_points={}",
            snapshot.active_users,
            snapshot.last_5_min,
            snapshot.last_30_min,
            snapshot.new_users,
            snapshot.timeline.len()
        );
        snapshot
    }

    /// Total and key events over the last day.
    pub async fn events(&self) -> EventTotals {
        let total_events = self.analytics.event_count(1).await;
        let events = self.analytics.key_events_count(1).await;

        EventTotals {
            total_events: ok_or_warn(total_events, "event count").unwrap_or(0),
            events: ok_or_warn(events, "key events").unwrap_or(0),
        }
    }

    pub async fn countries(&self, limit: u32) -> Vec<LocationRow> {
        let result = self.analytics.users_by_country(limit).await;
        Self::location_rows(ok_or_warn(result, "countries").unwrap_or_default())
    }

    pub async fn cities(&self, limit: u32) -> Vec<LocationRow> {
        let result = self.analytics.users_by_city(limit).await;
        Self::location_rows(ok_or_warn(result, "cities").unwrap_or_default())
    }

    fn location_rows(entries: Vec<BreakdownEntry>) -> Vec<LocationRow> {
        entries
            .into_iter()
            .map(|entry| LocationRow {
                name: entry.dimension_value,
                users: entry.metric_value,
            })
            .collect()
    }

    /// Side-by-side view of the standard realtime numbers and two raw
    /// `activeUsers` reports. Errors are collected rather than replaced so
    /// the output shows what actually went wrong.
    pub async fn diagnostics(&self) -> DiagnosticsReport {
        let mut errors = Vec::new();

        let seven_days = self
            .summarize(
                ReportQuery::new(DateRange::last_n_days(7)).metric("activeUsers"),
                &mut errors,
            )
            .await;
        let standard = collect_err(self.analytics.active_users().await, &mut errors);
        let last_30 = collect_err(
            self.analytics.active_users_in_last_minutes(30).await,
            &mut errors,
        );
        let today = self
            .summarize(
                ReportQuery::new(DateRange::today()).metric("activeUsers"),
                &mut errors,
            )
            .await;

        DiagnosticsReport {
            timestamp: chrono::Utc::now().to_rfc3339(),
            standard_active_users: standard.unwrap_or(0),
            last_30_min_users: last_30.unwrap_or(0),
            last_seven_days: seven_days,
            today,
            errors,
        }
    }

    async fn summarize(
        &self,
        query: ReportQuery,
        errors: &mut Vec<String>,
    ) -> Option<ReportSummary> {
        let result = collect_err(self.analytics.raw_report(&query).await, errors)?;
        Some(summarize_report(result))
    }
}

fn summarize_report(result: ReportResult) -> ReportSummary {
    ReportSummary {
        has_data: !result.rows.is_empty(),
        row_count: result.rows.len(),
        total_users: total_count(&result),
        first_row: result.rows.into_iter().next(),
    }
}

fn ok_or_warn<T>(result: Result<T, AnalyticsError>, view: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Using placeholder {} data: {}", view, e);
            None
        }
    }
}

fn collect_err<T>(result: Result<T, AnalyticsError>, errors: &mut Vec<String>) -> Option<T> {
    result.map_err(|e| errors.push(e.to_string())).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analytics::analytics_models::{ReportCell, ReportHeader, ReportRow};
    use async_trait::async_trait;

    /// Answers every query with the same rows, or with a 403 when `None`.
    struct FixedExecutor(Option<ReportResult>);

    #[async_trait]
    impl ReportExecutor for FixedExecutor {
        async fn run_report(&self, _query: &ReportQuery) -> Result<ReportResult, AnalyticsError> {
            self.0.clone().ok_or_else(|| AnalyticsError::ReportQuery {
                status: 403,
                body: "PERMISSION_DENIED".to_string(),
            })
        }
    }

    fn dashboard(result: Option<ReportResult>) -> DashboardService<FixedExecutor> {
        DashboardService::new(AnalyticsService::new(FixedExecutor(result)))
    }

    fn rows(pairs: &[(&str, &str)]) -> ReportResult {
        ReportResult {
            rows: pairs
                .iter()
                .map(|(dimension, metric)| ReportRow {
                    dimension_values: vec![Some(ReportCell::new(*dimension))],
                    metric_values: vec![Some(ReportCell::new(*metric))],
                })
                .collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_overview_formats_values() {
        let names = ["activeUsers", "screenPageViews", "userEngagementDuration", "bounceRate"];
        let values = ["32400", "94812", "152", "0.4823"];
        let report = ReportResult {
            metric_headers: names
                .iter()
                .map(|n| ReportHeader {
                    name: Some(n.to_string()),
                    kind: None,
                })
                .collect(),
            rows: vec![ReportRow {
                dimension_values: vec![],
                metric_values: values.iter().map(|v| Some(ReportCell::new(*v))).collect(),
            }],
            ..Default::default()
        };

        let overview = dashboard(Some(report)).overview().await;

        assert_eq!(overview.visitors.value, "32,400");
        assert_eq!(overview.pageviews.value, "94,812");
        assert_eq!(overview.avg_session_duration.value, "2:32");
        assert_eq!(overview.bounce_rate.value, "48.2%");
        assert_eq!(overview.visitors.change_percent, 0.0);
    }

    #[tokio::test]
    async fn test_errors_fall_back_to_placeholders() {
        let dashboard = dashboard(None);

        assert_eq!(dashboard.overview().await, OverviewStats::placeholder());
        assert!(dashboard.page_views_chart(7).await.is_empty());
        assert!(dashboard.bounce_rate_chart(7).await.is_empty());
        assert!(dashboard.top_pages_table(5).await.is_empty());
        assert_eq!(dashboard.devices().await, DeviceSlice::placeholder());
        assert_eq!(dashboard.realtime().await, RealtimeSnapshot::placeholder());
        assert_eq!(dashboard.events().await, EventTotals::placeholder());
        assert!(dashboard.countries(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_charts_format_dates() {
        let dashboard = dashboard(Some(rows(&[("20240105", "0.61"), ("20240106", "0.5")])));

        let bounce = dashboard.bounce_rate_chart(7).await;

        assert_eq!(bounce[0].name, "Jan 5");
        assert_eq!(bounce[0].value, 61.0);
        assert_eq!(bounce[1].value, 50.0);

        let views = dashboard.page_views_chart(7).await;
        assert_eq!(views[1].name, "Jan 6");
        assert_eq!(views[1].value, 0);
    }

    #[tokio::test]
    async fn test_top_pages_table_labels() {
        let dashboard = dashboard(Some(rows(&[("/", "300"), ("/ai-playground/", "120")])));

        let table = dashboard.top_pages_table(5).await;

        assert_eq!(
            table,
            vec![
                TopPageRow {
                    name: "Home".to_string(),
                    visitors: 300
                },
                TopPageRow {
                    name: "Ai playground".to_string(),
                    visitors: 120
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_devices_are_capitalized() {
        let dashboard = dashboard(Some(rows(&[("desktop", "12"), ("mobile", "5")])));

        let devices = dashboard.devices().await;

        assert_eq!(devices[0].name, "Desktop");
        assert_eq!(devices[0].device, "desktop");
        assert_eq!(devices[1].value, 5);
    }

    #[tokio::test]
    async fn test_empty_devices_use_placeholder() {
        let dashboard = dashboard(Some(ReportResult::default()));
        assert_eq!(dashboard.devices().await, DeviceSlice::placeholder());
    }

    #[tokio::test]
    async fn test_diagnostics_collects_errors() {
        let report = dashboard(None).diagnostics().await;

        assert_eq!(report.errors.len(), 4);
        assert!(report.last_seven_days.is_none());
        assert!(report.errors[0].contains("403"));
    }

    #[tokio::test]
    async fn test_diagnostics_summarizes_reports() {
        let report = dashboard(Some(rows(&[("", "4"), ("", "2")]))).diagnostics().await;

        let seven_days = report.last_seven_days.unwrap();
        assert!(seven_days.has_data);
        assert_eq!(seven_days.row_count, 2);
        assert_eq!(seven_days.total_users, 6);
        assert!(report.errors.is_empty());
    }
}
