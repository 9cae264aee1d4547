/// Open-Meteo Forecast API Client
///
/// Retrieves hourly weather forecasts (temperature, humidity, wind,
/// precipitation) for a coordinate. Used both for the weather CSV export
/// and for rainfall context alongside the air quality series.
///
/// API Documentation: https://open-meteo.com/en/docs

use serde::Deserialize;

use crate::model::{AqError, WeatherObservation};

const OPENMETEO_BASE_URL: &str = "https://api.open-meteo.com";

/// Hourly variables requested from the API, in column order.
const HOURLY_VARIABLES: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,precipitation";

// ============================================================================
// Open-Meteo API Response Structures
// ============================================================================

/// Forecast response from Open-Meteo
#[derive(Debug, Deserialize)]
pub struct OpenMeteoResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub hourly: OpenMeteoHourly,
}

/// Column-oriented hourly block. All columns are parallel to `time`.
#[derive(Debug, Deserialize)]
pub struct OpenMeteoHourly {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub relative_humidity_2m: Vec<Option<f64>>,
    pub wind_speed_10m: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Builds the hourly forecast URL for a coordinate.
pub fn build_forecast_url(latitude: f64, longitude: f64) -> String {
    format!(
        "{}/v1/forecast?latitude={}&longitude={}&hourly={}",
        OPENMETEO_BASE_URL, latitude, longitude, HOURLY_VARIABLES
    )
}

/// Fetch the hourly forecast for a coordinate.
///
/// # Returns
/// One [`WeatherObservation`] per hour, in the API's chronological order.
pub fn fetch_hourly(
    client: &reqwest::blocking::Client,
    latitude: f64,
    longitude: f64,
) -> Result<Vec<WeatherObservation>, Box<dyn std::error::Error>> {
    let url = build_forecast_url(latitude, longitude);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()?;

    if !response.status().is_success() {
        return Err(Box::new(AqError::HttpError(response.status().as_u16())));
    }

    let body = response.text()?;
    Ok(parse_forecast_response(&body)?)
}

/// Parse a forecast response body, zipping the column-oriented hourly block
/// into row observations.
///
/// Columns shorter or longer than `time` are a parse error: silently
/// truncating would misalign every value after the gap.
pub fn parse_forecast_response(body: &str) -> Result<Vec<WeatherObservation>, AqError> {
    let response: OpenMeteoResponse =
        serde_json::from_str(body).map_err(|e| AqError::ParseError(e.to_string()))?;

    let hourly = response.hourly;
    let n = hourly.time.len();
    for (name, len) in [
        ("temperature_2m", hourly.temperature_2m.len()),
        ("relative_humidity_2m", hourly.relative_humidity_2m.len()),
        ("wind_speed_10m", hourly.wind_speed_10m.len()),
        ("precipitation", hourly.precipitation.len()),
    ] {
        if len != n {
            return Err(AqError::ParseError(format!(
                "hourly column '{}' has {} entries, expected {}",
                name, len, n
            )));
        }
    }

    let mut observations = Vec::with_capacity(n);
    for i in 0..n {
        observations.push(WeatherObservation {
            time: hourly.time[i].clone(),
            temperature_c: hourly.temperature_2m[i],
            relative_humidity_pct: hourly.relative_humidity_2m[i],
            wind_speed_ms: hourly.wind_speed_10m[i],
            precipitation_mm: hourly.precipitation[i],
        });
    }

    Ok(observations)
}

// ============================================================================
// Precipitation Analysis Helpers
// ============================================================================

/// Calculate cumulative precipitation over a set of hourly observations.
pub fn calculate_cumulative_precip(observations: &[WeatherObservation]) -> f64 {
    observations
        .iter()
        .filter_map(|obs| obs.precipitation_mm)
        .sum()
}

/// Detect significant rainfall (>= threshold mm over the period).
pub fn detect_rainfall_event(observations: &[WeatherObservation], threshold_mm: f64) -> bool {
    calculate_cumulative_precip(observations) >= threshold_mm
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(time: &str, precip: Option<f64>) -> WeatherObservation {
        WeatherObservation {
            time: time.to_string(),
            temperature_c: Some(18.2),
            relative_humidity_pct: Some(71.0),
            wind_speed_ms: Some(3.4),
            precipitation_mm: precip,
        }
    }

    const SAMPLE_RESPONSE: &str = r#"{
        "latitude": 43.7,
        "longitude": -79.42,
        "hourly_units": {
            "time": "iso8601",
            "temperature_2m": "°C",
            "relative_humidity_2m": "%",
            "wind_speed_10m": "km/h",
            "precipitation": "mm"
        },
        "hourly": {
            "time": ["2025-10-01T00:00", "2025-10-01T01:00", "2025-10-01T02:00"],
            "temperature_2m": [12.4, 11.9, null],
            "relative_humidity_2m": [82.0, 85.0, 86.0],
            "wind_speed_10m": [9.7, 8.2, 7.5],
            "precipitation": [0.0, 0.3, 0.1]
        }
    }"#;

    #[test]
    fn test_parse_zips_columns_into_rows() {
        let observations = parse_forecast_response(SAMPLE_RESPONSE).unwrap();
        assert_eq!(observations.len(), 3);
        assert_eq!(observations[0].time, "2025-10-01T00:00");
        assert_eq!(observations[0].temperature_c, Some(12.4));
        assert_eq!(observations[1].precipitation_mm, Some(0.3));
    }

    #[test]
    fn test_parse_preserves_null_values() {
        let observations = parse_forecast_response(SAMPLE_RESPONSE).unwrap();
        assert_eq!(observations[2].temperature_c, None);
        assert_eq!(observations[2].relative_humidity_pct, Some(86.0));
    }

    #[test]
    fn test_parse_rejects_ragged_columns() {
        let body = r#"{
            "latitude": 43.7, "longitude": -79.42,
            "hourly": {
                "time": ["2025-10-01T00:00", "2025-10-01T01:00"],
                "temperature_2m": [12.4],
                "relative_humidity_2m": [82.0, 85.0],
                "wind_speed_10m": [9.7, 8.2],
                "precipitation": [0.0, 0.3]
            }
        }"#;
        let result = parse_forecast_response(body);
        match result {
            Err(AqError::ParseError(msg)) => assert!(msg.contains("temperature_2m")),
            other => panic!("expected ParseError for ragged columns, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(matches!(
            parse_forecast_response("<html>"),
            Err(AqError::ParseError(_))
        ));
    }

    #[test]
    fn test_build_forecast_url_includes_all_hourly_variables() {
        let url = build_forecast_url(43.7, -79.42);
        assert!(url.contains("latitude=43.7"));
        assert!(url.contains("longitude=-79.42"));
        assert!(url.contains("temperature_2m"));
        assert!(url.contains("relative_humidity_2m"));
        assert!(url.contains("wind_speed_10m"));
        assert!(url.contains("precipitation"));
    }

    #[test]
    fn test_cumulative_precip() {
        let observations = vec![
            obs("2025-10-01T00:00", Some(0.25)),
            obs("2025-10-01T01:00", Some(0.30)),
            obs("2025-10-01T02:00", None),
        ];
        assert_eq!(calculate_cumulative_precip(&observations), 0.55);
    }

    #[test]
    fn test_detect_rainfall_event() {
        let observations = vec![obs("2025-10-01T00:00", Some(0.75))];
        assert!(detect_rainfall_event(&observations, 0.5));
        assert!(!detect_rainfall_event(&observations, 1.0));
    }
}
