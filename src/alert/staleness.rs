/// Measurement staleness detection.
///
/// Urban reference stations typically report hourly. A stale series is
/// worse than a missing one — the dashboard would keep showing a
/// reassuring number long after the station went quiet. This module
/// provides staleness checking so the alerting path can flag gaps.
///
/// # Clock injection
/// All functions accept a `now: DateTime<Utc>` parameter rather than calling
/// `Utc::now()` internally. This makes staleness purely deterministic in
/// tests without mocking or time manipulation.

use crate::model::AirMeasurement;

// ---------------------------------------------------------------------------
// Staleness check
// ---------------------------------------------------------------------------

/// Returns `true` if the reading's datetime is older than `max_age_minutes`
/// relative to `now`.
///
/// Staleness is defined as strictly greater than the threshold:
///   age > max_age_minutes  →  stale
///   age == max_age_minutes →  not stale
///
/// Returns an error if the reading's datetime string cannot be parsed.
/// Callers should treat parse failures as stale (fail-safe default).
///
/// # Typical thresholds
/// - Hourly stations: 120 minutes (two missed updates)
/// - Alerting during an episode: 90 minutes
pub fn is_stale_at(
    reading: &AirMeasurement,
    max_age_minutes: u64,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<bool, String> {
    let observed = chrono::DateTime::parse_from_rfc3339(&reading.datetime)
        .map_err(|e| format!("unparseable datetime '{}': {}", reading.datetime, e))?
        .with_timezone(&chrono::Utc);

    let age_minutes = (now - observed).num_minutes().max(0) as u64;
    Ok(age_minutes > max_age_minutes)
}

/// Convenience wrapper that uses the real current time.
/// Use `is_stale_at` in tests to keep them deterministic.
pub fn is_stale(reading: &AirMeasurement, max_age_minutes: u64) -> Result<bool, String> {
    is_stale_at(reading, max_age_minutes, chrono::Utc::now())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AirMeasurement;
    use chrono::{TimeZone, Utc};

    fn reading_at(datetime: &str) -> AirMeasurement {
        AirMeasurement {
            location: "Karachi US Consulate".to_string(),
            city: "Karachi".to_string(),
            parameter: "pm25".to_string(),
            value: 62.0,
            unit: "µg/m³".to_string(),
            datetime: datetime.to_string(),
            latitude: Some(24.8415),
            longitude: Some(67.0091),
        }
    }

    /// A fixed "now" used across all tests: 2025-09-25 13:00:00 UTC.
    fn fixed_now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 25, 13, 0, 0).unwrap()
    }

    // --- Not stale ----------------------------------------------------------

    #[test]
    fn test_reading_5_minutes_old_is_not_stale() {
        let reading = reading_at("2025-09-25T12:55:00+00:00");
        let stale = is_stale_at(&reading, 60, fixed_now())
            .expect("valid datetime should not error");
        assert!(!stale, "5-minute-old reading should not be stale with 60-min threshold");
    }

    #[test]
    fn test_reading_exactly_at_threshold_is_not_stale() {
        // Age == threshold should NOT be considered stale (strictly greater than).
        let reading = reading_at("2025-09-25T12:00:00+00:00"); // 60 min ago
        let stale = is_stale_at(&reading, 60, fixed_now())
            .expect("valid datetime should not error");
        assert!(
            !stale,
            "reading exactly at threshold (60 min) should not be stale — \
             staleness is strictly greater than, not >=",
        );
    }

    #[test]
    fn test_reading_with_local_offset_parsed_correctly() {
        // OpenAQ returns station-local time with an offset.
        // 2025-09-25T18:00:00+05:00 == 2025-09-25T13:00:00Z — exactly 0 min old.
        let reading = reading_at("2025-09-25T18:00:00+05:00");
        let stale = is_stale_at(&reading, 60, fixed_now())
            .expect("timezone-offset datetime should parse correctly");
        assert!(!stale, "reading from 0 minutes ago should not be stale");
    }

    // --- Stale --------------------------------------------------------------

    #[test]
    fn test_reading_one_minute_past_threshold_is_stale() {
        let reading = reading_at("2025-09-25T11:59:00+00:00"); // 61 min ago
        let stale = is_stale_at(&reading, 60, fixed_now())
            .expect("valid datetime should not error");
        assert!(stale, "61-minute-old reading should be stale with 60-min threshold");
    }

    #[test]
    fn test_reading_from_hours_ago_is_stale() {
        let reading = reading_at("2025-09-25T09:00:00+00:00"); // 4 hours ago
        let stale = is_stale_at(&reading, 120, fixed_now())
            .expect("valid datetime should not error");
        assert!(stale, "4-hour-old reading should be stale with 120-min threshold");
    }

    #[test]
    fn test_reading_from_2020_is_stale_under_any_threshold() {
        let reading = reading_at("2020-01-01T00:00:00+00:00");
        let stale = is_stale_at(&reading, 120, fixed_now())
            .expect("old but valid datetime should parse");
        assert!(stale, "reading from 2020 should be stale under any reasonable threshold");
    }

    // --- Error handling -----------------------------------------------------

    #[test]
    fn test_invalid_datetime_returns_error() {
        let reading = reading_at("not-a-datetime");
        let result = is_stale_at(&reading, 60, fixed_now());
        assert!(
            result.is_err(),
            "unparseable datetime should return Err, got {:?}",
            result
        );
    }

    #[test]
    fn test_empty_datetime_returns_error() {
        let reading = reading_at("");
        let result = is_stale_at(&reading, 60, fixed_now());
        assert!(result.is_err(), "empty datetime should return Err");
    }

    // --- Threshold variation ------------------------------------------------

    #[test]
    fn test_same_reading_stale_under_tight_threshold_not_under_loose() {
        // Reading is 90 minutes old.
        let reading = reading_at("2025-09-25T11:30:00+00:00");
        let stale_60 = is_stale_at(&reading, 60, fixed_now()).expect("should not error");
        let stale_120 = is_stale_at(&reading, 120, fixed_now()).expect("should not error");
        assert!(stale_60, "90-min-old reading is stale under a 60-min threshold");
        assert!(!stale_120, "90-min-old reading is not stale under a 120-min threshold");
    }
}
