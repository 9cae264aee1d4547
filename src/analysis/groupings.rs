/// Organizes flat measurement lists into per-station views.
///
/// The ingest layer returns one flat series per query, ascending by time,
/// with every station's readings interleaved. The map and the field
/// statistics want exactly one reading per station — the newest.

use std::collections::HashMap;

use crate::model::AirMeasurement;

/// Collapses an ascending-sorted series to the newest reading per location.
///
/// Later readings overwrite earlier ones, so the input ordering contract
/// (ascending by observation time) is what makes "last write wins" mean
/// "newest wins". The result is sorted by location name for stable output.
pub fn latest_per_location(readings: &[AirMeasurement]) -> Vec<AirMeasurement> {
    let mut newest: HashMap<&str, &AirMeasurement> = HashMap::new();
    for reading in readings {
        newest.insert(reading.location.as_str(), reading);
    }

    let mut collapsed: Vec<AirMeasurement> = newest.into_values().cloned().collect();
    collapsed.sort_by(|a, b| a.location.cmp(&b.location));
    collapsed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
