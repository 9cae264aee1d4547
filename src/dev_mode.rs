/// Development mode utilities for working with archived data
///
/// When live OpenAQ data is unavailable, use this module to replay
/// archived measurements for testing and development.

use chrono::{DateTime, Duration, Utc};
use postgres::Client;

use crate::model::AirMeasurement;

/// Configuration for development mode data replay
pub struct DevMode {
    /// Simulate data as if it's this many days in the past
    pub days_offset: i64,
    /// Update interval in seconds (default: 3600 = hourly stations)
    pub update_interval_secs: i64,
}

impl DevMode {
    /// Create a new dev mode configuration
    ///
    /// # Arguments
    /// * `days_offset` - Replay data from this many days ago
    pub fn new(days_offset: i64) -> Self {
        Self {
            days_offset,
            update_interval_secs: 3600,
        }
    }

    /// Fetch archived readings as if they were current
    ///
    /// Returns the newest reading per station within a two-interval window
    /// ending `days_offset` days ago, simulating a live fetch.
    pub fn fetch_simulated_current_readings(
        &self,
        client: &mut Client,
        city: &str,
        parameter: &str,
    ) -> Result<Vec<AirMeasurement>, postgres::Error> {
        let simulated_now = Utc::now() - Duration::days(self.days_offset);
        let window_start = simulated_now - Duration::seconds(self.update_interval_secs * 2);

        let query = "
            SELECT DISTINCT ON (location)
                location,
                city,
                parameter,
                value,
                unit,
                measured_at,
                latitude,
                longitude
            FROM aqmon_raw.measurements
            WHERE city = $1
              AND parameter = $2
              AND measured_at >= $3
              AND measured_at <= $4
            ORDER BY location, measured_at DESC
        ";

        let rows = client.query(query, &[&city, &parameter, &window_start, &simulated_now])?;

        let mut readings = Vec::new();
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

    /// Get available archive date range for a city and parameter
    pub fn get_data_range(
        client: &mut Client,
        city: &str,
        parameter: &str,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, postgres::Error> {
        let row = client.query_one(
            "SELECT MIN(measured_at), MAX(measured_at)
             FROM aqmon_raw.measurements
             WHERE city = $1 AND parameter = $2",
            &[&city, &parameter],
        )?;

        let min: Option<DateTime<Utc>> = row.get(0);
        let max: Option<DateTime<Utc>> = row.get(1);

        match (min, max) {
            (Some(start), Some(end)) => Ok(Some((start, end))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_mode_creation() {
        let dev = DevMode::new(30);
        assert_eq!(dev.days_offset, 30);
        assert_eq!(dev.update_interval_secs, 3600);
    }
}
