//! Pollutant threshold checking.
//!
//! Classification is a pure function of parameter and value against the
//! WHO-like guideline table in `pollutants`: at or below the guideline is
//! Good, at or below twice the guideline is Moderate, above that Unhealthy.
//! Both boundaries are inclusive on the lower band.

use crate::model::AirMeasurement;
use crate::pollutants::guideline_for;

/// Air quality severity levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AirSeverity {
    Good,
    Moderate,
    Unhealthy,
}

impl AirSeverity {
    /// Traffic-light color used by the dashboard map and report output.
    pub fn color(&self) -> &'static str {
        match self {
            AirSeverity::Good => "green",
            AirSeverity::Moderate => "orange",
            AirSeverity::Unhealthy => "red",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AirSeverity::Good => "Good",
            AirSeverity::Moderate => "Moderate",
            AirSeverity::Unhealthy => "Unhealthy",
        }
    }
}

/// Classification of a single value, with the human-readable advisory.
///
/// `severity` is `None` when the value is missing (NaN) — "no data" is a
/// display state, not a severity level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelAssessment {
    pub severity: Option<AirSeverity>,
    pub message: String,
}

/// An alert triggered when a reading exceeds its guideline.
#[derive(Debug, Clone, PartialEq)]
pub struct AirAlert {
    pub severity: AirSeverity,
    pub location: String,
    pub parameter: String,
    pub value: f64,
    pub message: String,
}

/// Classifies a value against the parameter's guideline.
pub fn classify_level(parameter: &str, value: f64) -> Option<AirSeverity> {
    if value.is_nan() {
        return None;
    }
    let guideline = guideline_for(parameter);
    if value <= guideline {
        Some(AirSeverity::Good)
    } else if value <= 2.0 * guideline {
        Some(AirSeverity::Moderate)
    } else {
        Some(AirSeverity::Unhealthy)
    }
}

/// Classifies a value and builds the advisory message shown on the
/// dashboard alert card.
pub fn assess_level(parameter: &str, value: f64) -> LevelAssessment {
    let severity = classify_level(parameter, value);
    let message = match severity {
        None => "No recent measurement available.".to_string(),
        Some(AirSeverity::Good) => format!(
            "{} = {:.1} µg/m³. Air quality is good.",
            parameter.to_uppercase(),
            value
        ),
        Some(AirSeverity::Moderate) => format!(
            "{} = {:.1} µg/m³. Sensitive groups should limit prolonged outdoor exertion.",
            parameter.to_uppercase(),
            value
        ),
        Some(AirSeverity::Unhealthy) => format!(
            "{} = {:.1} µg/m³. Reduce outdoor activities; vulnerable people should stay indoors.",
            parameter.to_uppercase(),
            value
        ),
    };
    LevelAssessment { severity, message }
}

/// Checks a reading against its guideline and returns an alert if it is
/// above the Good band.
///
/// Returns `None` for readings at or below the guideline, and for readings
/// with no usable value.
pub fn check_threshold(reading: &AirMeasurement) -> Option<AirAlert> {
    let severity = classify_level(&reading.parameter, reading.value)?;
    if severity == AirSeverity::Good {
        return None;
    }
    let assessment = assess_level(&reading.parameter, reading.value);
    Some(AirAlert {
        severity,
        location: reading.location.clone(),
        parameter: reading.parameter.clone(),
        value: reading.value,
        message: assessment.message,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PARAM_PM25;

    fn reading(parameter: &str, value: f64) -> AirMeasurement {
        AirMeasurement {
            location: "Karachi US Consulate".to_string(),
            city: "Karachi".to_string(),
            parameter: parameter.to_string(),
            value,
            unit: "µg/m³".to_string(),
            datetime: "2025-09-25T15:00:00+05:00".to_string(),
            latitude: Some(24.8415),
            longitude: Some(67.0091),
        }
    }

    // --- Band boundaries ----------------------------------------------------

    #[test]
    fn test_value_at_guideline_is_good() {
        // The pm25 guideline is 15.0 — exactly at the guideline is Good,
        // not Moderate (boundary is inclusive on the lower band).
        assert_eq!(classify_level(PARAM_PM25, 15.0), Some(AirSeverity::Good));
    }

    #[test]
    fn test_value_just_above_guideline_is_moderate() {
        assert_eq!(classify_level(PARAM_PM25, 15.1), Some(AirSeverity::Moderate));
    }

    #[test]
    fn test_value_at_twice_guideline_is_moderate() {
        assert_eq!(classify_level(PARAM_PM25, 30.0), Some(AirSeverity::Moderate));
    }

    #[test]
    fn test_value_above_twice_guideline_is_unhealthy() {
        assert_eq!(classify_level(PARAM_PM25, 30.1), Some(AirSeverity::Unhealthy));
        assert_eq!(classify_level(PARAM_PM25, 180.0), Some(AirSeverity::Unhealthy));
    }

    #[test]
    fn test_nan_value_has_no_severity() {
        assert_eq!(classify_level(PARAM_PM25, f64::NAN), None);
        let assessment = assess_level(PARAM_PM25, f64::NAN);
        assert_eq!(assessment.severity, None);
        assert_eq!(assessment.message, "No recent measurement available.");
    }

    #[test]
    fn test_unknown_parameter_uses_default_guideline() {
        // Default guideline is 35.0.
        assert_eq!(classify_level("so2", 35.0), Some(AirSeverity::Good));
        assert_eq!(classify_level("so2", 36.0), Some(AirSeverity::Moderate));
        assert_eq!(classify_level("so2", 71.0), Some(AirSeverity::Unhealthy));
    }

    // --- Alert construction -------------------------------------------------

    #[test]
    fn test_good_reading_produces_no_alert() {
        assert!(check_threshold(&reading(PARAM_PM25, 10.0)).is_none());
    }

    #[test]
    fn test_moderate_reading_produces_alert_with_advisory() {
        let alert = check_threshold(&reading(PARAM_PM25, 22.0)).expect("should alert");
        assert_eq!(alert.severity, AirSeverity::Moderate);
        assert_eq!(alert.location, "Karachi US Consulate");
        assert!(alert.message.contains("PM25 = 22.0"));
        assert!(alert.message.contains("Sensitive groups"));
    }

    #[test]
    fn test_unhealthy_reading_produces_alert_with_advisory() {
        let alert = check_threshold(&reading(PARAM_PM25, 95.0)).expect("should alert");
        assert_eq!(alert.severity, AirSeverity::Unhealthy);
        assert!(alert.message.contains("stay indoors"));
    }

    #[test]
    fn test_nan_reading_produces_no_alert() {
        assert!(check_threshold(&reading(PARAM_PM25, f64::NAN)).is_none());
    }

    // --- Presentation helpers -----------------------------------------------

    #[test]
    fn test_severity_ordering_and_colors() {
        assert!(AirSeverity::Good < AirSeverity::Moderate);
        assert!(AirSeverity::Moderate < AirSeverity::Unhealthy);
        assert_eq!(AirSeverity::Good.color(), "green");
        assert_eq!(AirSeverity::Moderate.color(), "orange");
        assert_eq!(AirSeverity::Unhealthy.color(), "red");
    }

    #[test]
    fn test_good_assessment_message_wording() {
        let assessment = assess_level(PARAM_PM25, 12.3);
        assert_eq!(assessment.severity, Some(AirSeverity::Good));
        assert_eq!(assessment.message, "PM25 = 12.3 µg/m³. Air quality is good.");
    }
}
