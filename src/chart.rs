/// PNG chart and station map rendering.
///
/// Three chart families, all rendered to files under the configured charts
/// directory: the pollutant time series with its two baseline forecast
/// overlays, the four weather charts read off the weather CSV, and the
/// station map (a lat/lon scatter colored by threshold classification).

use std::error::Error;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDateTime};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use crate::alert::thresholds::{classify_level, AirSeverity};
use crate::forecast::ForecastPoint;
use crate::model::{AirMeasurement, WeatherObservation};

const CHART_SIZE: (u32, u32) = (1000, 500);
const MAP_SIZE: (u32, u32) = (900, 600);

// ---------------------------------------------------------------------------
// Time parsing and axis helpers
// ---------------------------------------------------------------------------

/// Parses either timestamp shape that reaches the chart layer: RFC 3339
/// with offset (OpenAQ) or naive minutes-resolution local time (Open-Meteo).
/// Offset timestamps chart as station-local wall time.
pub fn parse_chart_time(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").ok()
}

/// Y range padded 5% beyond the data so lines don't hug the frame.
/// A flat series gets a unit band around it.
pub fn padded_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

/// Marker color for the station map, by classification.
pub fn severity_marker_color(severity: Option<AirSeverity>) -> RGBColor {
    match severity {
        Some(AirSeverity::Good) => RGBColor(0, 180, 0),
        Some(AirSeverity::Moderate) => RGBColor(255, 165, 0),
        Some(AirSeverity::Unhealthy) => RGBColor(220, 20, 60),
        None => RGBColor(128, 128, 128),
    }
}

// ---------------------------------------------------------------------------
// Pollutant series + forecast
// ---------------------------------------------------------------------------

/// Renders the observation series with the persistence and rolling
/// baselines dashed past the end of it.
pub fn render_series_with_forecast(
    path: &Path,
    parameter: &str,
    unit: &str,
    readings: &[AirMeasurement],
    forecast: &[ForecastPoint],
) -> Result<(), Box<dyn Error>> {
    let observed: Vec<(NaiveDateTime, f64)> = readings
        .iter()
        .filter(|r| r.value.is_finite())
        .filter_map(|r| parse_chart_time(&r.datetime).map(|t| (t, r.value)))
        .collect();

    if observed.len() < 2 {
        return Err("not enough observations to chart".into());
    }

    let persistence: Vec<(NaiveDateTime, f64)> = forecast
        .iter()
        .filter_map(|p| parse_chart_time(&p.datetime).map(|t| (t, p.persistence)))
        .collect();
    let rolling: Vec<(NaiveDateTime, f64)> = forecast
        .iter()
        .filter_map(|p| parse_chart_time(&p.datetime).map(|t| (t, p.rolling)))
        .collect();

    let t_min = observed.first().unwrap().0;
    let t_max = persistence
        .last()
        .map(|(t, _)| *t)
        .unwrap_or(observed.last().unwrap().0);

    let all_values: Vec<f64> = observed
        .iter()
        .map(|(_, v)| *v)
        .chain(persistence.iter().map(|(_, v)| *v))
        .chain(rolling.iter().map(|(_, v)| *v))
        .collect();
    let (y_min, y_max) = padded_range(&all_values);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} observations + baseline forecast", parameter.to_uppercase()),
            ("sans-serif", 28),
        )
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(RangedDateTime::from(t_min..t_max), y_min..y_max)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|t: &NaiveDateTime| t.format("%m-%d %H:%M").to_string())
        .y_desc(format!("{} ({})", parameter.to_uppercase(), unit))
        .draw()?;

    chart
        .draw_series(LineSeries::new(observed.clone(), &BLUE))?
        .label("Observed")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLUE));
    chart.draw_series(
        observed
            .iter()
            .map(|(t, v)| Circle::new((*t, *v), 2, BLUE.filled())),
    )?;

    if !persistence.is_empty() {
        chart
            .draw_series(DashedLineSeries::new(persistence, 5, 3, RED.stroke_width(2)))?
            .label("Persistence forecast")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], RED));
        chart
            .draw_series(DashedLineSeries::new(
                rolling,
                2,
                2,
                RGBColor(255, 165, 0).stroke_width(2),
            ))?
            .label("Rolling forecast")
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], RGBColor(255, 165, 0))
            });
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Weather charts
// ---------------------------------------------------------------------------

/// The four weather chart endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherChartKind {
    Temperature,
    Humidity,
    Wind,
    Precipitation,
}

impl WeatherChartKind {
    /// Maps an endpoint path segment to a chart kind.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "temperature" => Some(WeatherChartKind::Temperature),
            "humidity" => Some(WeatherChartKind::Humidity),
            "wind" => Some(WeatherChartKind::Wind),
            "precipitation" => Some(WeatherChartKind::Precipitation),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WeatherChartKind::Temperature => "Temperature Over Time",
            WeatherChartKind::Humidity => "Humidity Over Time",
            WeatherChartKind::Wind => "Wind Speed Over Time",
            WeatherChartKind::Precipitation => "Precipitation Over Time",
        }
    }

    pub fn y_label(&self) -> &'static str {
        match self {
            WeatherChartKind::Temperature => "Temperature (°C)",
            WeatherChartKind::Humidity => "Humidity (%)",
            WeatherChartKind::Wind => "Wind Speed (m/s)",
            WeatherChartKind::Precipitation => "Precipitation (mm)",
        }
    }

    fn color(&self) -> RGBColor {
        match self {
            WeatherChartKind::Temperature => RED,
            WeatherChartKind::Humidity => BLUE,
            WeatherChartKind::Wind => RGBColor(128, 0, 128),
            WeatherChartKind::Precipitation => GREEN,
        }
    }

    fn extract(&self, obs: &WeatherObservation) -> Option<f64> {
        match self {
            WeatherChartKind::Temperature => obs.temperature_c,
            WeatherChartKind::Humidity => obs.relative_humidity_pct,
            WeatherChartKind::Wind => obs.wind_speed_ms,
            WeatherChartKind::Precipitation => obs.precipitation_mm,
        }
    }
}

/// Renders one weather variable over time: lines for temperature, humidity
/// and wind, bars for precipitation.
pub fn render_weather_chart(
    path: &Path,
    kind: WeatherChartKind,
    observations: &[WeatherObservation],
) -> Result<(), Box<dyn Error>> {
    let points: Vec<(NaiveDateTime, f64)> = observations
        .iter()
        .filter_map(|obs| {
            let value = kind.extract(obs)?;
            parse_chart_time(&obs.time).map(|t| (t, value))
        })
        .collect();

    if points.len() < 2 {
        return Err(format!("not enough {} data to chart", kind.title()).into());
    }

    let t_min = points.first().unwrap().0;
    let t_max = points.last().unwrap().0;
    let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
    let (mut y_min, y_max) = padded_range(&values);
    if kind == WeatherChartKind::Precipitation {
        y_min = 0.0; // bars grow from the baseline
    }

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(kind.title(), ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(RangedDateTime::from(t_min..t_max), y_min..y_max)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|t: &NaiveDateTime| t.format("%m-%d %H:%M").to_string())
        .y_desc(kind.y_label())
        .draw()?;

    let color = kind.color();
    match kind {
        WeatherChartKind::Precipitation => {
            let half_width = Duration::minutes(25);
            chart.draw_series(points.iter().map(|(t, v)| {
                Rectangle::new([(*t - half_width, 0.0), (*t + half_width, *v)], color.filled())
            }))?;
        }
        _ => {
            chart.draw_series(LineSeries::new(points, color.stroke_width(2)))?;
        }
    }

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Smoothing fit
// ---------------------------------------------------------------------------

/// Renders daily means against the one-step-ahead Holt-Winters fit.
pub fn render_daily_fit(
    path: &Path,
    parameter: &str,
    daily: &[(chrono::NaiveDate, f64)],
    fitted: &[f64],
) -> Result<(), Box<dyn Error>> {
    if daily.len() < 2 || fitted.len() != daily.len() {
        return Err("daily series and fit must align and span at least two days".into());
    }

    let d_min = daily.first().unwrap().0;
    let d_max = daily.last().unwrap().0;
    let all_values: Vec<f64> = daily
        .iter()
        .map(|(_, v)| *v)
        .chain(fitted.iter().cloned())
        .collect();
    let (y_min, y_max) = padded_range(&all_values);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} daily means + exponential smoothing fit", parameter.to_uppercase()),
            ("sans-serif", 28),
        )
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(d_min..d_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|d: &chrono::NaiveDate| d.format("%m-%d").to_string())
        .y_desc(format!("{} (daily mean)", parameter.to_uppercase()))
        .draw()?;

    chart
        .draw_series(LineSeries::new(daily.iter().cloned(), &BLUE))?
        .label("Observed")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLUE));
    chart
        .draw_series(DashedLineSeries::new(
            daily.iter().zip(fitted.iter()).map(|((d, _), f)| (*d, *f)),
            4,
            3,
            RED.stroke_width(2),
        ))?
        .label("Fitted")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], RED));

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Station map
// ---------------------------------------------------------------------------

/// Renders the station map: one marker per station (latest reading),
/// positioned by coordinates and colored by threshold classification.
pub fn render_station_map(
    path: &Path,
    parameter: &str,
    latest_per_location: &[AirMeasurement],
) -> Result<(), Box<dyn Error>> {
    let stations: Vec<(&AirMeasurement, f64, f64)> = latest_per_location
        .iter()
        .filter_map(|r| match (r.latitude, r.longitude) {
            (Some(lat), Some(lon)) => Some((r, lat, lon)),
            _ => None,
        })
        .collect();

    if stations.is_empty() {
        return Err("no station coordinates available to map".into());
    }

    let lats: Vec<f64> = stations.iter().map(|(_, lat, _)| *lat).collect();
    let lons: Vec<f64> = stations.iter().map(|(_, _, lon)| *lon).collect();
    let (lat_min, lat_max) = padded_range(&lats);
    let (lon_min, lon_max) = padded_range(&lons);

    let root = BitMapBackend::new(path, MAP_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Monitoring stations — latest {}", parameter.to_uppercase()),
            ("sans-serif", 28),
        )
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lon_min..lon_max, lat_min..lat_max)?;

    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .draw()?;

    chart.draw_series(stations.iter().map(|(reading, lat, lon)| {
        let color = severity_marker_color(classify_level(&reading.parameter, reading.value));
        Circle::new((*lon, *lat), 8, color.filled())
    }))?;

    chart.draw_series(stations.iter().map(|(reading, lat, lon)| {
        Text::new(
            format!("{} ({:.1})", reading.location, reading.value),
            (*lon, *lat),
            ("sans-serif", 14),
        )
    }))?;

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
