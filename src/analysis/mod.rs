/// Series organization and statistics for the monitoring service.
///
/// Submodules:
/// - `groupings` — collapses flat ingest output into per-station structures.
/// - `summary`   — trailing-window metrics, daily resampling, field stats.
/// - `smoothing` — Holt-Winters exponential smoothing over daily means.

pub mod groupings;
pub mod smoothing;
pub mod summary;
