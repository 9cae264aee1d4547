/// PostgreSQL archive for fetched measurements.
///
/// The service is useful without a database (everything renders from the
/// in-memory series), but archiving each fetch cycle gives the smoothing
/// analysis real history and lets dev mode replay past episodes.

use chrono::{DateTime, NaiveDateTime, Utc};
use postgres::{Client, NoTls};
use std::env;
use std::error::Error;

use crate::logging::{self, DataSource};
use crate::model::{AirMeasurement, WeatherObservation};

/// Connects using DATABASE_URL (via .env) and verifies the expected
/// schemas exist, returning an actionable error when they do not.
pub fn connect_and_verify(required_schemas: &[&str]) -> Result<Client, Box<dyn Error>> {
    dotenv::dotenv().ok();
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL not set. Add it to .env or the environment.")?;

    let mut client = Client::connect(&database_url, NoTls)?;

    for schema in required_schemas {
        let row = client.query_one(
            "SELECT EXISTS (SELECT 1 FROM information_schema.schemata WHERE schema_name = $1)",
            &[schema],
        )?;
        let exists: bool = row.get(0);
        if !exists {
            return Err(format!(
                "Database schema '{}' is missing.\n\
                 Apply the migration first:\n\
                 \n  psql -d aqmon_db -f sql/001_base_schema.sql\n",
                schema
            )
            .into());
        }
    }

    Ok(client)
}

/// Archives a measurement series. Duplicate readings (same location,
/// parameter, and observation time) are skipped via ON CONFLICT, so
/// overlapping fetch windows are harmless.
///
/// Returns the number of newly inserted rows. Rows whose datetime cannot
/// be parsed are logged and skipped rather than aborting the batch.
pub fn insert_measurements(
    client: &mut Client,
    readings: &[AirMeasurement],
) -> Result<u64, Box<dyn Error>> {
    let mut inserted = 0;

    for reading in readings {
        let measured_at = match DateTime::parse_from_rfc3339(&reading.datetime) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(e) => {
                logging::warn(
                    DataSource::Database,
                    Some(&reading.location),
                    &format!("skipping unparseable datetime '{}': {}", reading.datetime, e),
                );
                continue;
            }
        };

        let rows = client.execute(
            "INSERT INTO aqmon_raw.measurements
             (location, city, parameter, value, unit, measured_at, latitude, longitude)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (location, parameter, measured_at) DO NOTHING",
            &[
                &reading.location,
                &reading.city,
                &reading.parameter,
                &reading.value,
                &reading.unit,
                &measured_at,
                &reading.latitude,
                &reading.longitude,
            ],
        )?;
        inserted += rows;
    }

    Ok(inserted)
}

/// Archives hourly weather observations for a named place.
pub fn insert_weather_observations(
    client: &mut Client,
    place: &str,
    observations: &[WeatherObservation],
) -> Result<u64, Box<dyn Error>> {
    let mut inserted = 0;

    for obs in observations {
        let observed_at = match NaiveDateTime::parse_from_str(&obs.time, "%Y-%m-%dT%H:%M") {
            Ok(t) => t,
            Err(e) => {
                logging::warn(
                    DataSource::Database,
                    Some(place),
                    &format!("skipping unparseable time '{}': {}", obs.time, e),
                );
                continue;
            }
        };

        let rows = client.execute(
            "INSERT INTO aqmon_raw.weather_observations
             (place, observed_at, temperature_c, relative_humidity_pct,
              wind_speed_ms, precipitation_mm)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (place, observed_at) DO NOTHING",
            &[
                &place,
                &observed_at,
                &obs.temperature_c,
                &obs.relative_humidity_pct,
                &obs.wind_speed_ms,
                &obs.precipitation_mm,
            ],
        )?;
        inserted += rows;
    }

    Ok(inserted)
}

/// Loads the archived series for a city and parameter, ascending by
/// observation time, most recent `limit` readings.
pub fn load_archived_measurements(
    client: &mut Client,
    city: &str,
    parameter: &str,
    limit: i64,
) -> Result<Vec<AirMeasurement>, postgres::Error> {
    let rows = client.query(
        "SELECT location, city, parameter, value, unit, measured_at, latitude, longitude
         FROM (
             SELECT * FROM aqmon_raw.measurements
             WHERE city = $1 AND parameter = $2
             ORDER BY measured_at DESC
             LIMIT $3
         ) recent
         ORDER BY measured_at ASC",
        &[&city, &parameter, &limit],
    )?;

    let mut readings = Vec::with_capacity(rows.len());
    for row in rows {
        readings.push(AirMeasurement {
            location: row.get(0),
            city: row.get(1),
            parameter: row.get(2),
            value: row.get(3),
            unit: row.get(4),
            datetime: row.get::<_, DateTime<Utc>>(5).to_rfc3339(),
            latitude: row.get(6),
            longitude: row.get(7),
        });
    }

    Ok(readings)
}
