/// Service configuration, loaded from `aqmon.toml`.
///
/// Every field has a default matching the dashboard's stock controls. A
/// missing file means "run with the defaults"; a malformed or typo'd file
/// is an error.

use std::error::Error;
use std::path::Path;

use serde::Deserialize;

use crate::analysis::summary::BoundingBox;

pub const DEFAULT_CONFIG_PATH: &str = "aqmon.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AqmonConfig {
    pub query: QueryConfig,
    pub server: ServerConfig,
    pub weather: WeatherConfig,
    pub stats: StatsConfig,
    pub paths: PathsConfig,
}

/// Defaults for the measurement query (the dashboard sidebar controls).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    pub city: String,
    pub parameter: String,
    pub limit: u32,
    pub forecast_hours: u32,
    /// Readings older than this are flagged stale in reports.
    pub max_age_minutes: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
}

/// Coordinate used for Open-Meteo weather fetches.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Optional geographic restriction for the field statistics endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct StatsConfig {
    pub lat_min: Option<f64>,
    pub lat_max: Option<f64>,
    pub lon_min: Option<f64>,
    pub lon_max: Option<f64>,
}

impl StatsConfig {
    /// The configured bounding box, if all four edges are present.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match (self.lat_min, self.lat_max, self.lon_min, self.lon_max) {
            (Some(lat_min), Some(lat_max), Some(lon_min), Some(lon_max)) => Some(BoundingBox {
                lat_min,
                lat_max,
                lon_min,
                lon_max,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Where `fetch-weather` writes and the chart endpoints read.
    pub weather_csv: String,
    /// Bundled measurement sample for offline analysis.
    pub sample_csv: String,
    /// Directory chart PNGs are rendered into.
    pub charts_dir: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            city: "Karachi".to_string(),
            parameter: "pm25".to_string(),
            limit: 200,
            forecast_hours: 6,
            max_age_minutes: 120,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { port: 8600 }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        WeatherConfig {
            name: "Toronto".to_string(),
            latitude: 43.7,
            longitude: -79.42,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            weather_csv: "data/weather_data.csv".to_string(),
            sample_csv: "data/sample_openaq.csv".to_string(),
            charts_dir: "charts".to_string(),
        }
    }
}

impl Default for AqmonConfig {
    fn default() -> Self {
        AqmonConfig {
            query: QueryConfig::default(),
            server: ServerConfig::default(),
            weather: WeatherConfig::default(),
            stats: StatsConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

/// Loads configuration from a TOML file. A missing file yields the
/// defaults; an unreadable or malformed file is an error.
pub fn load_config(path: &Path) -> Result<AqmonConfig, Box<dyn Error>> {
    if !path.exists() {
        return Ok(AqmonConfig::default());
    }
    let contents = std::fs::read_to_string(path)?;
    let config: AqmonConfig = toml::from_str(&contents)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
