/// Trailing-window metrics, daily resampling, and field statistics.
///
/// All windows are anchored to the newest reading in the series rather than
/// the wall clock, so a series fetched an hour ago summarizes the same way
/// it did when it was fetched.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::model::AirMeasurement;

// ---------------------------------------------------------------------------
// Window metrics
// ---------------------------------------------------------------------------

/// The dashboard metrics row: latest value plus 24-hour mean and max.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub latest: Option<f64>,
    pub unit: Option<String>,
    pub avg_24h: Option<f64>,
    pub max_24h: Option<f64>,
}

fn parse_instant(datetime: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(datetime)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Readings within the trailing `hours` window, anchored at the newest
/// reading. Readings with unparseable datetimes are skipped.
pub fn window_hours<'a>(readings: &'a [AirMeasurement], hours: i64) -> Vec<&'a AirMeasurement> {
    let anchor = match readings.last().and_then(|r| parse_instant(&r.datetime)) {
        Some(t) => t,
        None => return Vec::new(),
    };
    let cutoff = anchor - Duration::hours(hours);

    readings
        .iter()
        .filter(|r| match parse_instant(&r.datetime) {
            Some(t) => t >= cutoff,
            None => false,
        })
        .collect()
}

/// Computes the metrics row for an ascending-sorted series.
pub fn summarize(readings: &[AirMeasurement]) -> SummaryMetrics {
    let latest = readings.last();
    let window = window_hours(readings, 24);
    let values: Vec<f64> = window
        .iter()
        .map(|r| r.value)
        .filter(|v| v.is_finite())
        .collect();

    SummaryMetrics {
        latest: latest.map(|r| r.value),
        unit: latest.map(|r| r.unit.clone()),
        avg_24h: if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        },
        max_24h: values.iter().cloned().fold(None, |acc, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        }),
    }
}

// ---------------------------------------------------------------------------
// Daily resampling
// ---------------------------------------------------------------------------

/// Resamples a series to daily means (station-local calendar days), sorted
/// ascending. Readings with unparseable datetimes or non-finite values are
/// skipped. This is the input shape the smoothing module expects.
pub fn daily_means(readings: &[AirMeasurement]) -> Vec<(NaiveDate, f64)> {
    let mut by_day: std::collections::BTreeMap<NaiveDate, (f64, usize)> =
        std::collections::BTreeMap::new();

    for reading in readings {
        if !reading.value.is_finite() {
            continue;
        }
        let day = match DateTime::parse_from_rfc3339(&reading.datetime) {
            Ok(dt) => dt.date_naive(),
            Err(_) => continue,
        };
        let entry = by_day.entry(day).or_insert((0.0, 0));
        entry.0 += reading.value;
        entry.1 += 1;
    }

    by_day
        .into_iter()
        .map(|(day, (sum, count))| (day, sum / count as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// Field statistics
// ---------------------------------------------------------------------------

/// Geographic bounding box for restricting field statistics, matching the
/// latitude/longitude slicing the stats endpoint applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&latitude)
            && (self.lon_min..=self.lon_max).contains(&longitude)
    }
}

/// Aggregate statistics over one value per station.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FieldStats {
    pub count: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

/// Computes count/mean/max/min over the latest reading per station,
/// optionally restricted to a bounding box. Stations without coordinates
/// are excluded when a box is given, included otherwise.
///
/// Returns `None` when no station survives the filter.
pub fn field_stats(
    latest_per_location: &[AirMeasurement],
    bbox: Option<&BoundingBox>,
) -> Option<FieldStats> {
    let values: Vec<f64> = latest_per_location
        .iter()
        .filter(|r| match (bbox, r.latitude, r.longitude) {
            (Some(b), Some(lat), Some(lon)) => b.contains(lat, lon),
            (Some(_), _, _) => false,
            (None, _, _) => true,
        })
        .map(|r| r.value)
        .filter(|v| v.is_finite())
        .collect();

    if values.is_empty() {
        return None;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);

    Some(FieldStats {
        count: values.len(),
        mean,
        max,
        min,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(datetime: &str, value: f64) -> AirMeasurement {
        AirMeasurement {
            location: "US Consulate".to_string(),
            city: "Karachi".to_string(),
            parameter: "pm25".to_string(),
            value,
            unit: "µg/m³".to_string(),
            datetime: datetime.to_string(),
            latitude: Some(24.86),
            longitude: Some(67.0),
        }
    }

    fn reading_at_coords(location: &str, value: f64, lat: Option<f64>, lon: Option<f64>) -> AirMeasurement {
        AirMeasurement {
            location: location.to_string(),
            city: "Toronto".to_string(),
            parameter: "no2".to_string(),
            value,
            unit: "µg/m³".to_string(),
            datetime: "2025-09-25T12:00:00-04:00".to_string(),
            latitude: lat,
            longitude: lon,
        }
    }

    // --- Window metrics -----------------------------------------------------

    #[test]
    fn test_summarize_anchors_window_at_newest_reading() {
        // Three readings: 30h old, 10h old, newest. The 30h-old one falls
        // outside the 24h window even though all three are "old" by wall
        // clock — the anchor is the newest reading.
        let readings = vec![
            reading("2025-09-24T06:00:00+05:00", 90.0),
            reading("2025-09-25T02:00:00+05:00", 30.0),
            reading("2025-09-25T12:00:00+05:00", 60.0),
        ];
        let metrics = summarize(&readings);
        assert_eq!(metrics.latest, Some(60.0));
        assert_eq!(metrics.avg_24h, Some(45.0), "90.0 is outside the window");
        assert_eq!(metrics.max_24h, Some(60.0));
        assert_eq!(metrics.unit.as_deref(), Some("µg/m³"));
    }

    #[test]
    fn test_summarize_empty_series() {
        let metrics = summarize(&[]);
        assert_eq!(metrics.latest, None);
        assert_eq!(metrics.avg_24h, None);
        assert_eq!(metrics.max_24h, None);
    }

    #[test]
    fn test_window_includes_boundary_reading() {
        // A reading exactly 24h before the anchor is inside the window.
        let readings = vec![
            reading("2025-09-24T12:00:00+05:00", 10.0),
            reading("2025-09-25T12:00:00+05:00", 20.0),
        ];
        assert_eq!(window_hours(&readings, 24).len(), 2);
    }

    #[test]
    fn test_window_skips_unparseable_datetimes() {
        let readings = vec![
            reading("garbage", 10.0),
            reading("2025-09-25T12:00:00+05:00", 20.0),
        ];
        let window = window_hours(&readings, 24);
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].value, 20.0);
    }

    // --- Daily resampling ---------------------------------------------------

    #[test]
    fn test_daily_means_groups_by_local_day() {
        let readings = vec![
            reading("2025-09-24T08:00:00+05:00", 10.0),
            reading("2025-09-24T20:00:00+05:00", 30.0),
            reading("2025-09-25T08:00:00+05:00", 50.0),
        ];
        let daily = daily_means(&readings);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].1, 20.0);
        assert_eq!(daily[1].1, 50.0);
        assert!(daily[0].0 < daily[1].0, "days sorted ascending");
    }

    #[test]
    fn test_daily_means_skips_nan_values() {
        let readings = vec![
            reading("2025-09-24T08:00:00+05:00", f64::NAN),
            reading("2025-09-24T20:00:00+05:00", 30.0),
        ];
        let daily = daily_means(&readings);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].1, 30.0);
    }

    // --- Field statistics ---------------------------------------------------

    #[test]
    fn test_field_stats_without_bbox() {
        let latest = vec![
            reading_at_coords("A", 10.0, Some(43.7), Some(-79.4)),
            reading_at_coords("B", 30.0, Some(45.4), Some(-75.7)),
            reading_at_coords("C", 20.0, None, None),
        ];
        let stats = field_stats(&latest, None).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, 20.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.min, 10.0);
    }

    #[test]
    fn test_field_stats_bbox_excludes_outside_and_uncoordinated() {
        // Box around southern Ontario: keeps A, drops Ottawa-ish B and
        // coordinate-less C.
        let bbox = BoundingBox {
            lat_min: 43.0,
            lat_max: 44.0,
            lon_min: -80.0,
            lon_max: -79.0,
        };
        let latest = vec![
            reading_at_coords("A", 10.0, Some(43.7), Some(-79.4)),
            reading_at_coords("B", 30.0, Some(45.4), Some(-75.7)),
            reading_at_coords("C", 20.0, None, None),
        ];
        let stats = field_stats(&latest, Some(&bbox)).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 10.0);
    }

    #[test]
    fn test_field_stats_empty_after_filter_is_none() {
        let bbox = BoundingBox {
            lat_min: 0.0,
            lat_max: 1.0,
            lon_min: 0.0,
            lon_max: 1.0,
        };
        let latest = vec![reading_at_coords("A", 10.0, Some(43.7), Some(-79.4))];
        assert!(field_stats(&latest, Some(&bbox)).is_none());
        assert!(field_stats(&[], None).is_none());
    }

    #[test]
    fn test_bounding_box_contains_is_inclusive() {
        let bbox = BoundingBox {
            lat_min: 41.0,
            lat_max: 83.0,
            lon_min: -141.0,
            lon_max: -52.0,
        };
        assert!(bbox.contains(41.0, -141.0));
        assert!(bbox.contains(83.0, -52.0));
        assert!(!bbox.contains(40.9, -100.0));
    }
}
