/// Baseline forecasting for pollutant series.
///
/// Two deliberately simple models projected side by side: persistence
/// (the last observed value) and the rolling mean of the last three
/// observations. The horizon is anchored at the newest observation's
/// timestamp, not the wall clock, so a forecast over fixed data is
/// reproducible.

use chrono::{DateTime, Duration};
use serde::Serialize;

use crate::model::{AirMeasurement, AqError};

/// One projected hour of the baseline forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// ISO 8601 time in the anchor's UTC offset.
    pub datetime: String,
    /// Last observed value carried forward.
    pub persistence: f64,
    /// Mean of the last three finite observations carried forward.
    pub rolling: f64,
}

/// Projects the baseline forecast `hours_ahead` hours past the newest
/// reading of an ascending-sorted series.
///
/// An empty series yields an empty forecast. If fewer than three finite
/// values exist, the rolling baseline averages what is there; with none,
/// it falls back to persistence.
pub fn make_forecast(
    readings: &[AirMeasurement],
    hours_ahead: u32,
) -> Result<Vec<ForecastPoint>, AqError> {
    let last = match readings.last() {
        Some(r) => r,
        None => return Ok(Vec::new()),
    };

    let anchor = DateTime::parse_from_rfc3339(&last.datetime)
        .map_err(|e| AqError::ParseError(format!("bad anchor datetime '{}': {}", last.datetime, e)))?;

    let persistence = last.value;

    let tail: Vec<f64> = readings
        .iter()
        .rev()
        .map(|r| r.value)
        .filter(|v| v.is_finite())
        .take(3)
        .collect();
    let rolling = if tail.is_empty() {
        persistence
    } else {
        tail.iter().sum::<f64>() / tail.len() as f64
    };

    let mut points = Vec::with_capacity(hours_ahead as usize);
    for i in 1..=i64::from(hours_ahead) {
        let t = anchor + Duration::hours(i);
        points.push(ForecastPoint {
            datetime: t.to_rfc3339(),
            persistence,
            rolling,
        });
    }

    Ok(points)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
