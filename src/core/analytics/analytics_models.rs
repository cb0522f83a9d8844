use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// REPORT QUERY
// ============================================================================
// The request body of a single `runReport` call. Field names serialize to the
// camelCase wire shape the Data API expects.

/// A date window. Both ends accept absolute dates (`2024-01-31`) or the
/// relative tokens the API understands (`7daysAgo`, `yesterday`, `today`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl DateRange {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// `NdaysAgo` through `today`.
    pub fn last_n_days(days: u32) -> Self {
        Self::new(format!("{}daysAgo", days), "today")
    }

    pub fn today() -> Self {
        Self::new("today", "today")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionOrderBy {
    pub dimension_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricOrderBy {
    pub metric_name: String,
}

/// Sort key for report rows. Exactly one of `dimension`/`metric` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<DimensionOrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricOrderBy>,
    pub desc: bool,
}

impl OrderBy {
    pub fn dimension(name: impl Into<String>, desc: bool) -> Self {
        Self {
            dimension: Some(DimensionOrderBy {
                dimension_name: name.into(),
            }),
            metric: None,
            desc,
        }
    }

    pub fn metric(name: impl Into<String>, desc: bool) -> Self {
        Self {
            dimension: None,
            metric: Some(MetricOrderBy {
                metric_name: name.into(),
            }),
            desc,
        }
    }
}

/// Description of one report call.
///
/// Built with the by-value builder methods and never mutated afterwards:
///
/// ```ignore
/// let query = ReportQuery::new(DateRange::last_n_days(30))
///     .dimension("pagePath")
///     .metric("screenPageViews")
///     .order_by(OrderBy::metric("screenPageViews", true))
///     .limit(5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub date_ranges: Vec<DateRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<Dimension>,
    pub metrics: Vec<Metric>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_bys: Vec<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub keep_empty_rows: bool,
}

impl ReportQuery {
    pub fn new(date_range: DateRange) -> Self {
        Self {
            date_ranges: vec![date_range],
            dimensions: Vec::new(),
            metrics: Vec::new(),
            order_bys: Vec::new(),
            limit: None,
            keep_empty_rows: false,
        }
    }

    pub fn dimension(mut self, name: impl Into<String>) -> Self {
        self.dimensions.push(Dimension { name: name.into() });
        self
    }

    pub fn metric(mut self, name: impl Into<String>) -> Self {
        self.metrics.push(Metric { name: name.into() });
        self
    }

    pub fn metrics<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metrics
            .extend(names.into_iter().map(|name| Metric { name: name.into() }));
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_bys.push(order);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn keep_empty_rows(mut self) -> Self {
        self.keep_empty_rows = true;
        self
    }
}

// ============================================================================
// REPORT RESULT
// ============================================================================
// The raw response. The API omits empty collections and may send `null`
// values, so every field is optional and absence is a normal case.

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportCell {
    #[serde(default)]
    pub value: Option<String>,
}

impl ReportCell {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}

/// One result row. Metric values line up positionally with
/// `ReportResult::metric_headers`, dimension values with `dimension_headers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[serde(default, deserialize_with = "null_as_default")]
    pub dimension_values: Vec<Option<ReportCell>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metric_values: Vec<Option<ReportCell>>,
}

impl ReportRow {
    pub fn dimension_value(&self, index: usize) -> Option<&str> {
        Self::cell_value(&self.dimension_values, index)
    }

    pub fn metric_value(&self, index: usize) -> Option<&str> {
        Self::cell_value(&self.metric_values, index)
    }

    fn cell_value(cells: &[Option<ReportCell>], index: usize) -> Option<&str> {
        cells
            .get(index)
            .and_then(|cell| cell.as_ref())
            .and_then(|cell| cell.value.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub dimension_headers: Vec<ReportHeader>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metric_headers: Vec<ReportHeader>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rows: Vec<ReportRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

// ============================================================================
// SHAPED RESULTS
// ============================================================================
// Small value objects handed to the presentation layer.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricValue {
    pub name: String,
    pub value: String,
}

/// Aggregate metrics over a date range, in metric-header order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    pub start_date: String,
    pub end_date: String,
    pub metrics: Vec<MetricValue>,
}

impl AnalyticsData {
    pub fn metric(&self, name: &str) -> Option<&str> {
        self.metrics
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value.as_str())
    }
}

/// One point of a daily series. `date` is the raw `YYYYMMDD` dimension value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint<T> {
    pub date: String,
    pub value: T,
}

/// One row of a top-N breakdown (page path, device, country, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownEntry {
    pub dimension_value: String,
    pub metric_value: u64,
}

/// Active users for one clock minute, labelled `H:MM`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinuteActivity {
    pub name: String,
    pub value: u64,
}
