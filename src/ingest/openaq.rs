/// OpenAQ Measurements API Client
///
/// Retrieves ground-station air quality measurements from the OpenAQ
/// platform for pollutant monitoring and alerting.
///
/// API Documentation: https://docs.openaq.org/
/// Measurements endpoint: https://api.openaq.org/v2/measurements

use chrono::DateTime;
use serde::Deserialize;

use crate::model::{AirMeasurement, AqError};

const OPENAQ_BASE_URL: &str = "https://api.openaq.org";

// ============================================================================
// OpenAQ API Response Structures
// ============================================================================

/// Measurements response from OpenAQ
#[derive(Debug, Deserialize)]
pub struct OpenAqResponse {
    pub results: Vec<OpenAqMeasurement>,
}

/// Single measurement record
#[derive(Debug, Deserialize)]
pub struct OpenAqMeasurement {
    pub location: String,
    pub city: Option<String>,
    pub parameter: String,
    pub value: f64,
    pub unit: String,
    pub date: OpenAqDate,
    pub coordinates: Option<OpenAqCoordinates>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAqDate {
    pub utc: String,
    /// Station-local time with offset, e.g. "2025-09-25T14:00:00+05:00"
    pub local: String,
}

#[derive(Debug, Deserialize)]
pub struct OpenAqCoordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Builds the measurements query URL for a city and parameter.
///
/// The API returns newest-first (`sort=desc`); [`parse_measurements_response`]
/// re-sorts ascending so callers can treat the last element as the latest.
pub fn build_measurements_url(city: &str, parameter: &str, limit: u32) -> String {
    format!(
        "{}/v2/measurements?city={}&parameter={}&limit={}&sort=desc&order_by=date",
        OPENAQ_BASE_URL,
        encode_query_value(city),
        parameter,
        limit
    )
}

/// Percent-encodes the characters that actually occur in registry city
/// names (spaces). Everything else passes through unchanged.
fn encode_query_value(value: &str) -> String {
    value.replace(' ', "%20")
}

/// Fetch measurements for a city and pollutant parameter.
///
/// # Parameters
/// - `client`: HTTP client
/// - `city`: city name as listed in OpenAQ (e.g. "Karachi")
/// - `parameter`: pollutant code (e.g. "pm25")
/// - `limit`: maximum number of records to request
///
/// # Returns
/// Measurements sorted ascending by local observation time.
pub fn fetch_measurements(
    client: &reqwest::blocking::Client,
    city: &str,
    parameter: &str,
    limit: u32,
) -> Result<Vec<AirMeasurement>, Box<dyn std::error::Error>> {
    let url = build_measurements_url(city, parameter, limit);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()?;

    if !response.status().is_success() {
        return Err(Box::new(AqError::HttpError(response.status().as_u16())));
    }

    let body = response.text()?;
    let readings = parse_measurements_response(&body)?;

    if readings.is_empty() {
        return Err(Box::new(AqError::NoDataAvailable(city.to_string())));
    }

    Ok(readings)
}

/// Parse an OpenAQ measurements response body.
///
/// Flattens the nested `date`/`coordinates` objects, drops records with a
/// non-finite value, and sorts ascending by local observation time. A record
/// whose datetime cannot be parsed fails the whole response.
pub fn parse_measurements_response(body: &str) -> Result<Vec<AirMeasurement>, AqError> {
    let response: OpenAqResponse =
        serde_json::from_str(body).map_err(|e| AqError::ParseError(e.to_string()))?;

    let mut keyed: Vec<(i64, AirMeasurement)> = Vec::with_capacity(response.results.len());
    for record in response.results {
        if !record.value.is_finite() {
            continue;
        }

        let instant = DateTime::parse_from_rfc3339(&record.date.local)
            .map_err(|e| AqError::ParseError(format!("bad datetime '{}': {}", record.date.local, e)))?;

        let (latitude, longitude) = match record.coordinates {
            Some(c) => (c.latitude, c.longitude),
            None => (None, None),
        };

        keyed.push((
            instant.timestamp(),
            AirMeasurement {
                location: record.location,
                city: record.city.unwrap_or_default(),
                parameter: record.parameter,
                value: record.value,
                unit: record.unit,
                datetime: record.date.local,
                latitude,
                longitude,
            },
        ));
    }

    keyed.sort_by_key(|(ts, _)| *ts);
    Ok(keyed.into_iter().map(|(_, m)| m).collect())
}

// ============================================================================
// Series Helpers
// ============================================================================

/// The newest reading in an ascending-sorted series.
pub fn latest_reading(readings: &[AirMeasurement]) -> Option<&AirMeasurement> {
    readings.last()
}

/// Readings that carry usable coordinates, for map rendering.
pub fn readings_with_coordinates(readings: &[AirMeasurement]) -> Vec<&AirMeasurement> {
    readings
        .iter()
        .filter(|r| r.latitude.is_some() && r.longitude.is_some())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
