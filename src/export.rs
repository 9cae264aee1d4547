/// CSV export and import.
///
/// One column schema is used everywhere a measurement series crosses a file
/// boundary (dashboard export, bundled samples, offline analysis), so
/// anything this service writes it can also read back. The weather CSV
/// header names are fixed; the chart endpoints read that file.

use std::error::Error;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{AirMeasurement, WeatherObservation};

// ---------------------------------------------------------------------------
// Measurement CSV
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct MeasurementRow {
    datetime: String,
    value: f64,
    unit: String,
    city: String,
    location: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl From<&AirMeasurement> for MeasurementRow {
    fn from(m: &AirMeasurement) -> Self {
        MeasurementRow {
            datetime: m.datetime.clone(),
            value: m.value,
            unit: m.unit.clone(),
            city: m.city.clone(),
            location: m.location.clone(),
            latitude: m.latitude,
            longitude: m.longitude,
        }
    }
}

/// Writes a measurement series as CSV.
///
/// The pollutant parameter is not a column; a file holds one parameter's
/// series and the caller names the file accordingly (`karachi_pm25.csv`).
/// `parameter` is recorded by the reader from the caller instead.
pub fn write_measurements_csv<W: Write>(
    writer: W,
    readings: &[AirMeasurement],
) -> Result<(), Box<dyn Error>> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for reading in readings {
        csv_writer.serialize(MeasurementRow::from(reading))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Renders a measurement series to a CSV string (the HTTP export endpoint).
pub fn measurements_to_csv_string(readings: &[AirMeasurement]) -> Result<String, Box<dyn Error>> {
    let mut buffer = Vec::new();
    write_measurements_csv(&mut buffer, readings)?;
    Ok(String::from_utf8(buffer)?)
}

/// Writes a measurement series to a file path.
pub fn save_measurements_csv(
    path: &Path,
    readings: &[AirMeasurement],
) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    write_measurements_csv(file, readings)
}

/// Reads a measurement series from CSV, tagging every row with `parameter`
/// (the schema stores one parameter per file). Rows come back in file
/// order; sample files are stored ascending by time.
pub fn read_measurements_csv<R: Read>(
    reader: R,
    parameter: &str,
) -> Result<Vec<AirMeasurement>, Box<dyn Error>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut readings = Vec::new();
    for row in csv_reader.deserialize() {
        let row: MeasurementRow = row?;
        readings.push(AirMeasurement {
            location: row.location,
            city: row.city,
            parameter: parameter.to_string(),
            value: row.value,
            unit: row.unit,
            datetime: row.datetime,
            latitude: row.latitude,
            longitude: row.longitude,
        });
    }
    Ok(readings)
}

/// Loads a measurement sample from a file path.
pub fn load_measurements_csv(
    path: &Path,
    parameter: &str,
) -> Result<Vec<AirMeasurement>, Box<dyn Error>> {
    let file = File::open(path)?;
    read_measurements_csv(file, parameter)
}

// ---------------------------------------------------------------------------
// Weather CSV
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct WeatherRow {
    time: String,
    #[serde(rename = "temperature_C")]
    temperature_c: Option<f64>,
    #[serde(rename = "humidity_%")]
    humidity_pct: Option<f64>,
    #[serde(rename = "wind_speed_m/s")]
    wind_speed_ms: Option<f64>,
    #[serde(rename = "precipitation_mm")]
    precipitation_mm: Option<f64>,
}

/// Writes hourly weather observations as CSV with the established headers.
pub fn write_weather_csv<W: Write>(
    writer: W,
    observations: &[WeatherObservation],
) -> Result<(), Box<dyn Error>> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for obs in observations {
        csv_writer.serialize(WeatherRow {
            time: obs.time.clone(),
            temperature_c: obs.temperature_c,
            humidity_pct: obs.relative_humidity_pct,
            wind_speed_ms: obs.wind_speed_ms,
            precipitation_mm: obs.precipitation_mm,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes hourly weather observations to a file path.
pub fn save_weather_csv(
    path: &Path,
    observations: &[WeatherObservation],
) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    write_weather_csv(file, observations)
}

/// Reads hourly weather observations from CSV.
pub fn read_weather_csv<R: Read>(reader: R) -> Result<Vec<WeatherObservation>, Box<dyn Error>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut observations = Vec::new();
    for row in csv_reader.deserialize() {
        let row: WeatherRow = row?;
        observations.push(WeatherObservation {
            time: row.time,
            temperature_c: row.temperature_c,
            relative_humidity_pct: row.humidity_pct,
            wind_speed_ms: row.wind_speed_ms,
            precipitation_mm: row.precipitation_mm,
        });
    }
    Ok(observations)
}

/// Loads hourly weather observations from a file path.
pub fn load_weather_csv(path: &Path) -> Result<Vec<WeatherObservation>, Box<dyn Error>> {
    let file = File::open(path)?;
    read_weather_csv(file)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(location: &str, value: f64, lat: Option<f64>) -> AirMeasurement {
        AirMeasurement {
            location: location.to_string(),
            city: "Karachi".to_string(),
            parameter: "pm25".to_string(),
            value,
            unit: "µg/m³".to_string(),
            datetime: "2025-09-25T12:00:00+05:00".to_string(),
            latitude: lat,
            longitude: lat.map(|_| 67.0),
        }
    }

    #[test]
    fn test_measurement_csv_header_and_rows() {
        let readings = vec![reading("US Consulate", 62.0, Some(24.84))];
        let csv = measurements_to_csv_string(&readings).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "datetime,value,unit,city,location,latitude,longitude"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2025-09-25T12:00:00+05:00,62.0,µg/m³,Karachi,US Consulate,24.84,67.0"
        );
    }

    #[test]
    fn test_measurement_csv_round_trip() {
        let readings = vec![
            reading("US Consulate", 62.0, Some(24.84)),
            reading("Korangi", 48.5, None),
        ];
        let csv = measurements_to_csv_string(&readings).unwrap();
        let back = read_measurements_csv(csv.as_bytes(), "pm25").unwrap();
        assert_eq!(back, readings);
    }

    #[test]
    fn test_missing_coordinates_are_empty_fields() {
        let readings = vec![reading("Korangi", 48.5, None)];
        let csv = measurements_to_csv_string(&readings).unwrap();
        assert!(csv.lines().nth(1).unwrap().ends_with(",,"));
    }

    #[test]
    fn test_weather_csv_uses_established_header_names() {
        let observations = vec![WeatherObservation {
            time: "2025-10-01T00:00".to_string(),
            temperature_c: Some(12.4),
            relative_humidity_pct: Some(82.0),
            wind_speed_ms: Some(2.7),
            precipitation_mm: Some(0.0),
        }];
        let mut buffer = Vec::new();
        write_weather_csv(&mut buffer, &observations).unwrap();
        let csv = String::from_utf8(buffer).unwrap();
        assert!(csv.starts_with("time,temperature_C,humidity_%,wind_speed_m/s,precipitation_mm"));
        assert!(csv.contains("2025-10-01T00:00,12.4,82.0,2.7,0.0"));
    }

    #[test]
    fn test_weather_csv_round_trip_with_gaps() {
        let observations = vec![
            WeatherObservation {
                time: "2025-10-01T00:00".to_string(),
                temperature_c: None,
                relative_humidity_pct: Some(82.0),
                wind_speed_ms: None,
                precipitation_mm: Some(0.3),
            },
        ];
        let mut buffer = Vec::new();
        write_weather_csv(&mut buffer, &observations).unwrap();
        let back = read_weather_csv(buffer.as_slice()).unwrap();
        assert_eq!(back, observations);
    }

    #[test]
    fn test_read_rejects_malformed_rows() {
        let csv = "datetime,value,unit,city,location,latitude,longitude\n\
                   2025-09-25T12:00:00+05:00,not-a-number,µg/m³,Karachi,Korangi,,\n";
        assert!(read_measurements_csv(csv.as_bytes(), "pm25").is_err());
    }
}
