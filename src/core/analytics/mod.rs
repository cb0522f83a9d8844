pub mod analytics_error;
pub mod analytics_models;
pub mod analytics_ports;
pub mod analytics_service;
pub mod report_shaping;

pub use analytics_error::AnalyticsError;
pub use analytics_models::{
    AnalyticsData, BreakdownEntry, DateRange, MetricValue, MinuteActivity, OrderBy, ReportQuery,
    ReportResult, ReportRow, TimeSeriesPoint,
};
pub use analytics_ports::{ReportExecutor, TokenProvider};
pub use analytics_service::AnalyticsService;
