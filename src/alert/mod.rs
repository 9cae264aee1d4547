/// Threshold classification and data-freshness checks.
///
/// Submodules:
/// - `thresholds` — WHO-like guideline classification and alert building.
/// - `staleness` — clock-injected age checks for the newest reading.

pub mod staleness;
pub mod thresholds;
