pub mod dashboard_models;
pub mod dashboard_service;
pub mod formatting;

pub use dashboard_models::{
    ChartPoint, DeviceSlice, DiagnosticsReport, EventTotals, LocationRow, OverviewStats,
    RealtimeSnapshot, ReportSummary, StatCard, TopPageRow,
};
pub use dashboard_service::DashboardService;
