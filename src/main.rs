// This is the entry point of the analytics reporter.
//
// **Architecture Overview:**
// - `core/` = Query catalog, shaping and dashboard formatting (no HTTP)
// - `infra/` = Google implementations of the core traits
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Run the requested dashboard view and print it as JSON
//
// Usage: portfolio_analytics <view> [days|limit]
//   views: overview, pageViews, bounceRate, topPages, devices, realtime,
//          events, countries, cities, debug

use anyhow::{bail, Context};
use portfolio_analytics::core::analytics::analytics_service::{
    DEFAULT_LOCATION_LIMIT, DEFAULT_SERIES_DAYS, DEFAULT_TOP_PAGES,
};
use portfolio_analytics::core::analytics::AnalyticsService;
use portfolio_analytics::core::dashboard::{
    DashboardService, DeviceSlice, EventTotals, OverviewStats, RealtimeSnapshot,
};
use portfolio_analytics::infra::google::{
    AnalyticsSettings, GoogleAnalyticsClient, ServiceAccountTokenProvider,
};
use serde_json::{json, Value};

const VIEWS: [&str; 10] = [
    "overview",
    "pageViews",
    "bounceRate",
    "topPages",
    "devices",
    "realtime",
    "events",
    "countries",
    "cities",
    "debug",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let view = args.next().unwrap_or_else(|| "overview".to_string());
    let param = args.next();

    if !VIEWS.contains(&view.as_str()) {
        bail!(
            "Invalid analytics view '{}'. Expected one of: {}",
            view,
            VIEWS.join(", ")
        );
    }

    let settings = AnalyticsSettings::from_env()
        .await
        .context("Failed to read analytics settings")?;

    // Without credentials there is nothing to query; show the same
    // placeholders the dashboard uses when Google Analytics is down.
    if !settings.is_configured() {
        tracing::warn!(
            "Google Analytics is not configured (GOOGLE_CLIENT_EMAIL, GOOGLE_PRIVATE_KEY, GA_PROPERTY_ID); showing placeholder data"
        );
        print_json(&placeholder(&view))?;
        return Ok(());
    }

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // token cache -> report client -> typed queries -> dashboard

    let tokens = ServiceAccountTokenProvider::new(settings.clone())
        .context("Failed to create token provider")?;
    let client =
        GoogleAnalyticsClient::new(&settings, tokens).context("Failed to create GA client")?;
    let dashboard = DashboardService::new(AnalyticsService::new(client));

    let output = match view.as_str() {
        "overview" => serde_json::to_value(dashboard.overview().await)?,
        "pageViews" => {
            let days = parse_param(param.as_deref(), DEFAULT_SERIES_DAYS);
            serde_json::to_value(dashboard.page_views_chart(days).await)?
        }
        "bounceRate" => {
            let days = parse_param(param.as_deref(), DEFAULT_SERIES_DAYS);
            serde_json::to_value(dashboard.bounce_rate_chart(days).await)?
        }
        "topPages" => {
            let limit = parse_param(param.as_deref(), DEFAULT_TOP_PAGES);
            serde_json::to_value(dashboard.top_pages_table(limit).await)?
        }
        "devices" => serde_json::to_value(dashboard.devices().await)?,
        "realtime" => serde_json::to_value(dashboard.realtime().await)?,
        "events" => serde_json::to_value(dashboard.events().await)?,
        "countries" => {
            let limit = parse_param(param.as_deref(), DEFAULT_LOCATION_LIMIT);
            serde_json::to_value(dashboard.countries(limit).await)?
        }
        "cities" => {
            let limit = parse_param(param.as_deref(), DEFAULT_LOCATION_LIMIT);
            serde_json::to_value(dashboard.cities(limit).await)?
        }
        _ => serde_json::to_value(dashboard.diagnostics().await)?,
    };

    print_json(&output)
}

/// Positive integer argument, or `default` when missing or invalid.
fn parse_param(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn placeholder(view: &str) -> Value {
    match view {
        "overview" => json!(OverviewStats::placeholder()),
        "devices" => json!(DeviceSlice::placeholder()),
        "realtime" => json!(RealtimeSnapshot::placeholder()),
        "events" => json!(EventTotals::placeholder()),
        "debug" => json!({ "error": "Google Analytics is not configured" }),
        _ => json!([]),
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
