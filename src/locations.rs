/// City registry for the air quality monitoring service.
///
/// Defines the canonical list of cities monitored by this service, with the
/// name OpenAQ indexes them under, the coordinate used for Open-Meteo
/// weather queries, and the pollutant parameters each city's stations are
/// expected to report. All other modules should reference cities from here
/// rather than hardcoding names or coordinates.

use crate::model::{PARAM_NO2, PARAM_O3, PARAM_PM10, PARAM_PM25};

// ---------------------------------------------------------------------------
// City metadata
// ---------------------------------------------------------------------------

/// Metadata for a single monitored city.
pub struct City {
    /// City name exactly as listed in OpenAQ.
    pub name: &'static str,
    /// ISO 3166-1 alpha-2 country code.
    pub country: &'static str,
    /// WGS84 latitude used for Open-Meteo weather queries.
    pub latitude: f64,
    /// WGS84 longitude used for Open-Meteo weather queries.
    pub longitude: f64,
    /// Which parameters this city's stations are expected to report.
    pub expected_parameters: &'static [&'static str],
}

/// All monitored cities. The first entry is the dashboard default.
pub static CITY_REGISTRY: &[City] = &[
    City {
        name: "Karachi",
        country: "PK",
        latitude: 24.8607,
        longitude: 67.0011,
        expected_parameters: &[PARAM_PM25, PARAM_PM10],
    },
    City {
        name: "Lahore",
        country: "PK",
        latitude: 31.5204,
        longitude: 74.3587,
        expected_parameters: &[PARAM_PM25, PARAM_PM10, PARAM_NO2],
    },
    City {
        name: "Toronto",
        country: "CA",
        latitude: 43.7,
        longitude: -79.42,
        expected_parameters: &[PARAM_PM25, PARAM_NO2, PARAM_O3],
    },
    City {
        name: "Ottawa",
        country: "CA",
        latitude: 45.4215,
        longitude: -75.6972,
        expected_parameters: &[PARAM_PM25, PARAM_NO2, PARAM_O3],
    },
    City {
        name: "Delhi",
        country: "IN",
        latitude: 28.6139,
        longitude: 77.2090,
        expected_parameters: &[PARAM_PM25, PARAM_PM10, PARAM_NO2, PARAM_O3],
    },
    City {
        name: "Los Angeles",
        country: "US",
        latitude: 34.0522,
        longitude: -118.2437,
        expected_parameters: &[PARAM_PM25, PARAM_NO2, PARAM_O3],
    },
];

/// Returns the names of all monitored cities.
pub fn all_city_names() -> Vec<&'static str> {
    CITY_REGISTRY.iter().map(|c| c.name).collect()
}

/// Looks up a city by name (case-sensitive, as OpenAQ matching is).
pub fn find_city(name: &str) -> Option<&'static City> {
    CITY_REGISTRY.iter().find(|c| c.name == name)
}

/// The dashboard default city.
pub fn default_city() -> &'static City {
    &CITY_REGISTRY[0]
}

/// Returns cities whose stations are expected to report a parameter.
pub fn cities_with_parameter(param_code: &str) -> Vec<&'static str> {
    CITY_REGISTRY
        .iter()
        .filter(|c| c.expected_parameters.contains(&param_code))
        .map(|c| c.name)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
