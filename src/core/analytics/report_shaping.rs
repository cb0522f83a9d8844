// Pure functions that turn raw report rows into the shaped value objects.
//
// Rules shared by every shape:
// - counts parse as base-10 integers, 0 when absent or unparseable; trailing
//   garbage makes the whole value unparseable ("12abc" is 0, not 12)
// - rates parse as floats, 0.0 when absent, unparseable or non-finite
// - absent dimension values fall back to a caller-chosen label ("" by default)
// - row order is never changed

use super::analytics_models::{
    BreakdownEntry, MetricValue, MinuteActivity, ReportResult, TimeSeriesPoint,
};
use chrono::{Duration, NaiveDateTime, Timelike};
use std::collections::HashSet;

/// Number of one-minute buckets in the realtime timeline.
pub const TIMELINE_MINUTES: u32 = 30;

/// Parses a count. Fractional strings truncate toward zero (`"12.7"` -> 12).
pub fn parse_count(value: Option<&str>) -> u64 {
    let Some(raw) = value.map(str::trim) else {
        return 0;
    };

    raw.parse::<u64>()
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v.trunc() as u64)
        })
        .unwrap_or(0)
}

pub fn parse_rate(value: Option<&str>) -> f64 {
    value
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Pairs the first row's metric values with the metric headers.
///
/// One entry per header, in header order. Missing values become `"0"` and
/// unnamed headers `"unknown"`. A report without rows yields no entries.
pub fn shape_metrics(result: &ReportResult) -> Vec<MetricValue> {
    let Some(row) = result.rows.first() else {
        return Vec::new();
    };

    result
        .metric_headers
        .iter()
        .enumerate()
        .map(|(index, header)| MetricValue {
            name: header
                .name
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            value: row.metric_value(index).unwrap_or("0").to_string(),
        })
        .collect()
}

/// `date` dimension x one metric, parsed with `parse` (counts or rates).
pub fn shape_time_series<T>(
    result: &ReportResult,
    parse: impl Fn(Option<&str>) -> T,
) -> Vec<TimeSeriesPoint<T>> {
    result
        .rows
        .iter()
        .map(|row| TimeSeriesPoint {
            date: row.dimension_value(0).unwrap_or_default().to_string(),
            value: parse(row.metric_value(0)),
        })
        .collect()
}

/// One dimension x one count metric. `missing_label` replaces absent
/// dimension values.
pub fn shape_breakdown(result: &ReportResult, missing_label: &str) -> Vec<BreakdownEntry> {
    result
        .rows
        .iter()
        .map(|row| BreakdownEntry {
            dimension_value: row.dimension_value(0).unwrap_or(missing_label).to_string(),
            metric_value: parse_count(row.metric_value(0)),
        })
        .collect()
}

/// First metric of the first row, as a count.
pub fn first_count(result: &ReportResult) -> u64 {
    parse_count(result.rows.first().and_then(|row| row.metric_value(0)))
}

/// Sum of the first metric across all rows.
pub fn total_count(result: &ReportResult) -> u64 {
    result
        .rows
        .iter()
        .map(|row| parse_count(row.metric_value(0)))
        .sum()
}

/// Sums active users over rows whose `minute` dimension (`"00"`..`"59"`)
/// falls within the `window` minutes ending at `current_minute`, wrapping
/// around the hour.
pub fn sum_minute_window(result: &ReportResult, current_minute: u32, window: u32) -> u64 {
    let valid: HashSet<String> = (0..window.min(60))
        .map(|offset| format!("{:02}", (current_minute + 60 - offset % 60) % 60))
        .collect();

    result
        .rows
        .iter()
        .filter(|row| row.dimension_value(0).is_some_and(|m| valid.contains(m)))
        .map(|row| parse_count(row.metric_value(0)))
        .sum()
}

/// Builds a 30-point per-minute timeline ending at `now`, oldest first.
///
/// Minute values are matched on hour and minute when they look like
/// `HHMM`/`HHMMSS`, and on minute alone when they are two digits.
pub fn shape_minute_timeline(result: &ReportResult, now: NaiveDateTime) -> Vec<MinuteActivity> {
    let mut timeline: Vec<MinuteActivity> = (0..TIMELINE_MINUTES)
        .map(|offset| {
            let point = now - Duration::minutes(i64::from(offset));
            let (hour, minute) = (point.hour(), point.minute());

            let value = result
                .rows
                .iter()
                .find(|row| {
                    row.dimension_value(0)
                        .is_some_and(|raw| minute_matches(raw, hour, minute))
                })
                .map(|row| parse_count(row.metric_value(0)))
                .unwrap_or(0);

            MinuteActivity {
                name: format!("{}:{:02}", hour, minute),
                value,
            }
        })
        .collect();

    timeline.reverse();
    timeline
}

fn minute_matches(raw: &str, hour: u32, minute: u32) -> bool {
    let field = |range: std::ops::Range<usize>| raw.get(range).and_then(|s| s.parse::<u32>().ok());

    if raw.len() >= 4 {
        field(0..2) == Some(hour) && field(2..4) == Some(minute)
    } else {
        raw.parse::<u32>().ok() == Some(minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analytics::analytics_models::{ReportCell, ReportHeader, ReportRow};
    use chrono::NaiveDate;

    fn row(dimension: Option<&str>, metric: Option<&str>) -> ReportRow {
        ReportRow {
            dimension_values: vec![dimension.map(ReportCell::new)],
            metric_values: vec![metric.map(ReportCell::new)],
        }
    }

    fn result(rows: Vec<ReportRow>) -> ReportResult {
        ReportResult {
            rows,
            ..Default::default()
        }
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_count_defaults() {
        assert_eq!(parse_count(Some("120")), 120);
        assert_eq!(parse_count(Some(" 7 ")), 7);
        assert_eq!(parse_count(Some("12.9")), 12);
        assert_eq!(parse_count(Some("abc")), 0);
        assert_eq!(parse_count(Some("12abc")), 0);
        assert_eq!(parse_count(Some("-3")), 0);
        assert_eq!(parse_count(Some("")), 0);
        assert_eq!(parse_count(None), 0);
    }

    #[test]
    fn test_parse_rate_defaults() {
        assert_eq!(parse_rate(Some("0.4213")), 0.4213);
        assert_eq!(parse_rate(Some("NaN")), 0.0);
        assert_eq!(parse_rate(Some("inf")), 0.0);
        assert_eq!(parse_rate(Some("n/a")), 0.0);
        assert_eq!(parse_rate(None), 0.0);
    }

    #[test]
    fn test_time_series_keeps_row_order() {
        let report = result(vec![
            row(Some("20240101"), Some("120")),
            row(Some("20240102"), Some("95")),
        ]);

        let series = shape_time_series(&report, parse_count);

        assert_eq!(
            series,
            vec![
                TimeSeriesPoint {
                    date: "20240101".to_string(),
                    value: 120
                },
                TimeSeriesPoint {
                    date: "20240102".to_string(),
                    value: 95
                },
            ]
        );
    }

    #[test]
    fn test_absent_values_become_zero() {
        let report = result(vec![row(None, None)]);

        let counts = shape_time_series(&report, parse_count);
        let rates = shape_time_series(&report, parse_rate);

        assert_eq!(counts[0].date, "");
        assert_eq!(counts[0].value, 0);
        assert_eq!(rates[0].value, 0.0);
        assert!(!rates[0].value.is_nan());
    }

    #[test]
    fn test_breakdown_does_not_reorder() {
        let report = result(vec![
            row(Some("/"), Some("300")),
            row(Some("/projects"), Some("120")),
            row(None, Some("7")),
        ]);

        let entries = shape_breakdown(&report, "");

        let labels: Vec<&str> = entries.iter().map(|e| e.dimension_value.as_str()).collect();
        let counts: Vec<u64> = entries.iter().map(|e| e.metric_value).collect();
        assert_eq!(labels, vec!["/", "/projects", ""]);
        assert_eq!(counts, vec![300, 120, 7]);

        assert_eq!(shape_breakdown(&report, "Unknown")[2].dimension_value, "Unknown");
    }

    #[test]
    fn test_metrics_follow_header_order() {
        let report = ReportResult {
            metric_headers: vec![
                ReportHeader {
                    name: Some("activeUsers".to_string()),
                    kind: None,
                },
                ReportHeader {
                    name: Some("bounceRate".to_string()),
                    kind: None,
                },
                ReportHeader::default(),
            ],
            rows: vec![ReportRow {
                dimension_values: vec![],
                metric_values: vec![Some(ReportCell::new("42")), None],
            }],
            ..Default::default()
        };

        let metrics = shape_metrics(&report);

        assert_eq!(
            metrics,
            vec![
                MetricValue {
                    name: "activeUsers".to_string(),
                    value: "42".to_string()
                },
                MetricValue {
                    name: "bounceRate".to_string(),
                    value: "0".to_string()
                },
                MetricValue {
                    name: "unknown".to_string(),
                    value: "0".to_string()
                },
            ]
        );
        assert!(shape_metrics(&ReportResult::default()).is_empty());
    }

    #[test]
    fn test_shaping_is_repeatable() {
        let report = result(vec![
            row(Some("desktop"), Some("10")),
            row(Some("mobile"), Some("4")),
        ]);

        assert_eq!(shape_breakdown(&report, ""), shape_breakdown(&report, ""));
        assert_eq!(
            shape_time_series(&report, parse_rate),
            shape_time_series(&report, parse_rate)
        );
    }

    #[test]
    fn test_minute_window_wraps_hour() {
        let report = result(vec![
            row(Some("58"), Some("2")),
            row(Some("02"), Some("3")),
            row(Some("30"), Some("100")),
            row(None, Some("50")),
        ]);

        // 02, 01, 00, 59, 58
        assert_eq!(sum_minute_window(&report, 2, 5), 5);
        assert_eq!(sum_minute_window(&report, 2, 60), 105);
        assert_eq!(sum_minute_window(&report, 2, 0), 0);
    }

    #[test]
    fn test_totals() {
        let report = result(vec![row(None, Some("4")), row(None, Some("6"))]);
        assert_eq!(first_count(&report), 4);
        assert_eq!(total_count(&report), 10);
        assert_eq!(first_count(&ReportResult::default()), 0);
    }

    #[test]
    fn test_minute_timeline_oldest_first() {
        let report = result(vec![
            row(Some("143000"), Some("5")),
            row(Some("1401"), Some("2")),
        ]);

        let timeline = shape_minute_timeline(&report, at(14, 30));

        assert_eq!(timeline.len(), TIMELINE_MINUTES as usize);
        assert_eq!(timeline[0].name, "14:01");
        assert_eq!(timeline[0].value, 2);
        assert_eq!(timeline[29].name, "14:30");
        assert_eq!(timeline[29].value, 5);
        assert_eq!(timeline.iter().map(|p| p.value).sum::<u64>(), 7);
    }

    #[test]
    fn test_minute_timeline_crosses_midnight() {
        let report = result(vec![row(Some("59"), Some("3"))]);

        let timeline = shape_minute_timeline(&report, at(0, 10));

        assert_eq!(timeline[0].name, "23:41");
        assert_eq!(timeline[29].name, "0:10");
        let hit = timeline.iter().find(|p| p.name == "23:59").unwrap();
        assert_eq!(hit.value, 3);
    }
}
