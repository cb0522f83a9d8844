// View models for the dashboard. They serialize to the JSON the charts and
// tables on the site consume, and each one has a zero-valued placeholder the
// dashboard falls back to when Google Analytics is unavailable.

use crate::core::analytics::{MinuteActivity, ReportRow};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCard {
    pub value: String,
    /// Always 0 for now; period-over-period comparison isn't queried.
    pub change_percent: f64,
    pub description: String,
}

impl StatCard {
    fn new(value: impl Into<String>, description: &str) -> Self {
        Self {
            value: value.into(),
            change_percent: 0.0,
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub visitors: StatCard,
    pub pageviews: StatCard,
    pub avg_session_duration: StatCard,
    pub bounce_rate: StatCard,
}

impl OverviewStats {
    pub fn from_values(
        visitors: String,
        pageviews: String,
        duration: String,
        bounce_rate: String,
    ) -> Self {
        Self {
            visitors: StatCard::new(visitors, "Total visitors this month"),
            pageviews: StatCard::new(pageviews, "Total pageviews this month"),
            avg_session_duration: StatCard::new(duration, "Average time on site"),
            bounce_rate: StatCard::new(
                bounce_rate,
                "Visitors who leave after viewing only one page",
            ),
        }
    }

    pub fn placeholder() -> Self {
        Self::from_values(
            "0".to_string(),
            "0".to_string(),
            "0:00".to_string(),
            "0.0%".to_string(),
        )
    }
}

/// A labelled chart value (`{ name: "Jan 5", value: 42 }`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint<T> {
    pub name: String,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPageRow {
    pub name: String,
    pub visitors: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSlice {
    pub name: String,
    pub value: u64,
    pub device: String,
}

impl DeviceSlice {
    /// Shown when there is no device data at all.
    pub fn placeholder() -> Vec<Self> {
        [("Desktop", 1), ("Mobile", 0), ("Tablet", 0)]
            .into_iter()
            .map(|(name, value)| Self {
                name: name.to_string(),
                value,
                device: name.to_lowercase(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRow {
    pub name: String,
    pub users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeSnapshot {
    pub active_users: u64,
    pub new_users: u64,
    pub timeline: Vec<MinuteActivity>,
    #[serde(rename = "last30Min")]
    pub last_30_min: u64,
    #[serde(rename = "last5Min")]
    pub last_5_min: u64,
}

impl RealtimeSnapshot {
    pub fn placeholder() -> Self {
        Self {
            active_users: 0,
            new_users: 0,
            timeline: Vec::new(),
            last_30_min: 0,
            last_5_min: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTotals {
    pub total_events: u64,
    pub events: u64,
}

impl EventTotals {
    pub fn placeholder() -> Self {
        Self {
            total_events: 0,
            events: 0,
        }
    }
}

/// Condensed view of one raw report, for troubleshooting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub has_data: bool,
    pub row_count: usize,
    pub total_users: u64,
    pub first_row: Option<ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsReport {
    pub timestamp: String,
    pub standard_active_users: u64,
    pub last_30_min_users: u64,
    pub last_seven_days: Option<ReportSummary>,
    pub today: Option<ReportSummary>,
    /// Error messages collected while building the report.
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overview_placeholder_json() {
        let value = serde_json::to_value(OverviewStats::placeholder()).unwrap();

        assert_eq!(value["visitors"]["value"], json!("0"));
        assert_eq!(value["avgSessionDuration"]["value"], json!("0:00"));
        assert_eq!(value["bounceRate"]["changePercent"], json!(0.0));
    }

    #[test]
    fn test_realtime_field_names() {
        let value = serde_json::to_value(RealtimeSnapshot::placeholder()).unwrap();

        for key in ["activeUsers", "newUsers", "timeline", "last30Min", "last5Min"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_device_placeholder() {
        let slices = DeviceSlice::placeholder();

        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].name, "Desktop");
        assert_eq!(slices[0].value, 1);
        assert_eq!(slices[2].device, "tablet");
    }
}
