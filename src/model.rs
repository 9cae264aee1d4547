/// Core data types for the air quality monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic, no I/O, and no external dependencies — only types.

// ---------------------------------------------------------------------------
// Parameter codes
// ---------------------------------------------------------------------------

/// OpenAQ parameter code for fine particulate matter (PM2.5), in µg/m³.
pub const PARAM_PM25: &str = "pm25";

/// OpenAQ parameter code for coarse particulate matter (PM10), in µg/m³.
pub const PARAM_PM10: &str = "pm10";

/// OpenAQ parameter code for nitrogen dioxide, in µg/m³.
pub const PARAM_NO2: &str = "no2";

/// OpenAQ parameter code for ozone, in µg/m³.
pub const PARAM_O3: &str = "o3";

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single ground-station measurement from the OpenAQ API.
///
/// Corresponds to one entry in the `results[]` array of an OpenAQ
/// measurements response, flattened so the nested `date` and `coordinates`
/// objects become plain fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AirMeasurement {
    /// Station name within the city, e.g. "Karachi US Consulate".
    pub location: String,
    pub city: String,
    pub parameter: String,
    pub value: f64,
    pub unit: String,
    /// ISO 8601 local time, e.g. "2025-09-25T14:00:00+05:00".
    pub datetime: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One hourly row from the Open-Meteo forecast response, after zipping the
/// column-oriented `hourly` block. Any field may be missing for a given hour.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    /// Naive local time as returned by the API, e.g. "2025-10-01T14:00".
    pub time: String,
    pub temperature_c: Option<f64>,
    pub relative_humidity_pct: Option<f64>,
    pub wind_speed_ms: Option<f64>,
    pub precipitation_mm: Option<f64>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or processing air quality data.
#[derive(Debug, PartialEq)]
pub enum AqError {
    /// Non-2xx HTTP response from an upstream API.
    HttpError(u16),
    /// The response body could not be deserialized.
    ParseError(String),
    /// The requested city returned no stations in the response.
    CityNotFound(String),
    /// The city was found but contained no usable measurement values.
    NoDataAvailable(String),
    /// A reading exists but is older than the configured freshness threshold.
    StaleData { location: String, age_minutes: u64 },
}

impl std::fmt::Display for AqError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AqError::HttpError(code) => write!(f, "HTTP error: {}", code),
            AqError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AqError::CityNotFound(city) => write!(f, "City not found: {}", city),
            AqError::NoDataAvailable(city) => write!(f, "No data available for city: {}", city),
            AqError::StaleData { location, age_minutes } => {
                write!(f, "Stale data for {}: {} minutes old", location, age_minutes)
            }
        }
    }
}

impl std::error::Error for AqError {}
