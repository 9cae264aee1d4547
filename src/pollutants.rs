/// Pollutant registry for the air quality monitoring service.
///
/// Defines the canonical list of pollutants monitored by this service,
/// along with their metadata and WHO-like guideline values used for
/// traffic-light classification. This is the single source of truth for
/// parameter codes — all other modules should reference pollutants from
/// here rather than hardcoding codes.

pub use crate::model::{PARAM_NO2, PARAM_O3, PARAM_PM10, PARAM_PM25};

// ---------------------------------------------------------------------------
// Pollutant metadata
// ---------------------------------------------------------------------------

/// Metadata for a single monitored pollutant.
pub struct Pollutant {
    /// OpenAQ parameter code, lowercase.
    pub code: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Reporting unit for all guideline comparisons.
    pub unit: &'static str,
    /// WHO-like guideline concentration. Values at or below this are
    /// classified Good; above twice this, Unhealthy.
    pub guideline: f64,
}

/// Fallback guideline for parameters with no registry entry, in µg/m³.
pub const DEFAULT_GUIDELINE: f64 = 35.0;

/// All pollutants monitored by this service, in dashboard display order.
///
/// Guideline sources: WHO 2021 global air quality guidelines (24h for
/// particulates and NO2, 8h peak season for ozone), rounded the way the
/// alerting table rounds them.
pub static POLLUTANT_REGISTRY: &[Pollutant] = &[
    Pollutant {
        code: PARAM_PM25,
        name: "Fine particulate matter (PM2.5)",
        unit: "µg/m³",
        guideline: 15.0,
    },
    Pollutant {
        code: PARAM_NO2,
        name: "Nitrogen dioxide",
        unit: "µg/m³",
        guideline: 40.0,
    },
    Pollutant {
        code: PARAM_O3,
        name: "Ozone",
        unit: "µg/m³",
        guideline: 100.0,
    },
    Pollutant {
        code: PARAM_PM10,
        name: "Coarse particulate matter (PM10)",
        unit: "µg/m³",
        guideline: 45.0,
    },
];

/// Returns the parameter codes for all monitored pollutants.
pub fn all_parameter_codes() -> Vec<&'static str> {
    POLLUTANT_REGISTRY.iter().map(|p| p.code).collect()
}

/// Looks up a pollutant by parameter code. Returns `None` if not found.
pub fn find_pollutant(code: &str) -> Option<&'static Pollutant> {
    POLLUTANT_REGISTRY.iter().find(|p| p.code == code)
}

/// Returns the guideline for a parameter, falling back to
/// [`DEFAULT_GUIDELINE`] for codes not in the registry.
pub fn guideline_for(code: &str) -> f64 {
    find_pollutant(code).map(|p| p.guideline).unwrap_or(DEFAULT_GUIDELINE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_parameter_codes_are_valid_openaq_format() {
        // OpenAQ parameter codes are short lowercase alphanumeric strings.
        // Anything else would silently match no measurements in the API.
        for pollutant in POLLUTANT_REGISTRY {
            assert!(
                !pollutant.code.is_empty() && pollutant.code.len() <= 8,
                "parameter code for '{}' should be 1-8 chars, got '{}'",
                pollutant.name,
                pollutant.code
            );
            assert!(
                pollutant
                    .code
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()),
                "parameter code for '{}' should be lowercase alphanumeric, got '{}'",
                pollutant.name,
                pollutant.code
            );
        }
    }

    #[test]
    fn test_no_duplicate_parameter_codes() {
        let mut seen = std::collections::HashSet::new();
        for pollutant in POLLUTANT_REGISTRY {
            assert!(
                seen.insert(pollutant.code),
                "duplicate parameter code '{}' found in POLLUTANT_REGISTRY",
                pollutant.code
            );
        }
    }

    #[test]
    fn test_registry_contains_all_dashboard_parameters() {
        let expected = [PARAM_PM25, PARAM_NO2, PARAM_O3, PARAM_PM10];
        let codes: Vec<_> = POLLUTANT_REGISTRY.iter().map(|p| p.code).collect();
        for expected_code in &expected {
            assert!(
                codes.contains(expected_code),
                "POLLUTANT_REGISTRY missing expected parameter '{}'",
                expected_code
            );
        }
    }

    #[test]
    fn test_guidelines_match_alerting_table() {
        assert_eq!(guideline_for(PARAM_PM25), 15.0);
        assert_eq!(guideline_for(PARAM_NO2), 40.0);
        assert_eq!(guideline_for(PARAM_O3), 100.0);
        assert_eq!(guideline_for(PARAM_PM10), 45.0);
    }

    #[test]
    fn test_unknown_parameter_falls_back_to_default_guideline() {
        assert_eq!(guideline_for("so2"), DEFAULT_GUIDELINE);
        assert_eq!(guideline_for(""), DEFAULT_GUIDELINE);
    }

    #[test]
    fn test_guidelines_are_positive() {
        // A zero or negative guideline would classify every reading as
        // Unhealthy regardless of value.
        for pollutant in POLLUTANT_REGISTRY {
            assert!(
                pollutant.guideline > 0.0,
                "guideline for '{}' must be positive",
                pollutant.name
            );
        }
        assert!(DEFAULT_GUIDELINE > 0.0);
    }

    #[test]
    fn test_find_pollutant_returns_correct_entry() {
        let pm25 = find_pollutant(PARAM_PM25).expect("pm25 should be in registry");
        assert_eq!(pm25.code, "pm25");
        assert!(pm25.name.contains("PM2.5"));
    }

    #[test]
    fn test_find_pollutant_returns_none_for_unknown_code() {
        assert!(find_pollutant("co2").is_none());
    }

    #[test]
    fn test_all_parameter_codes_helper_matches_registry_length() {
        assert_eq!(all_parameter_codes().len(), POLLUTANT_REGISTRY.len());
    }

    #[test]
    fn test_all_units_are_micrograms_per_cubic_meter() {
        // The threshold table is only meaningful in mass concentration;
        // a ppm entry would need a conversion step before classification.
        for pollutant in POLLUTANT_REGISTRY {
            assert_eq!(pollutant.unit, "µg/m³", "unit mismatch for '{}'", pollutant.name);
        }
    }
}
