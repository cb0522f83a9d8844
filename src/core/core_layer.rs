// The core module contains all reporting logic.
// Each feature gets its own submodule.

#[path = "analytics/mod.rs"]
pub mod analytics;

#[path = "dashboard/mod.rs"]
pub mod dashboard;
