// Reporting client behind the portfolio site's analytics dashboard.
//
// **Architecture Overview:**
// - `core/` = Query catalog, report shaping and dashboard formatting (no HTTP)
// - `infra/` = Google implementations of the core traits (JWT signing, OAuth, Data API)
//
// The binary in `main.rs` is the composition root that wires the two together.

// Same trick as the binary: point each layer at a descriptive root file
// instead of a pile of identical mod.rs files.
#[path = "core/core_layer.rs"]
pub mod core;
#[path = "infra/infra_layer.rs"]
pub mod infra;
