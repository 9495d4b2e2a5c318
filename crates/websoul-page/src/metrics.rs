//! Metric names recorded during page assembly.
//!
//! Recording is a no-op until a recorder is installed (the relay installs a
//! Prometheus one).

/// Fragment loads (counter, labels: fragment, outcome).
pub const FRAGMENT_LOADS_TOTAL: &str = "fragment_loads_total";
/// Behavior initializations (counter, labels: trigger).
pub const PAGE_INITIALIZATIONS_TOTAL: &str = "page_initializations_total";
/// Link rewrite passes (counter).
pub const LINK_REWRITES_TOTAL: &str = "link_rewrites_total";
/// Page assembly duration seconds (histogram).
pub const PAGE_ASSEMBLY_DURATION_SECONDS: &str = "page_assembly_duration_seconds";
