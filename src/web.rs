/// HTTP service exposing the derived products.
///
/// State is loaded once at startup (live fetch, falling back to the bundled
/// sample when the API is unreachable); the chart endpoints re-render from
/// that state on each request. Endpoints:
///
///   GET /                     service info
///   GET /air/stats            field statistics JSON (optionally bbox-restricted)
///   GET /air/alerts           per-station classification JSON
///   GET /air/forecast         baseline forecast JSON
///   GET /air/chart            series + forecast PNG
///   GET /air/map              station map PNG
///   GET /air/export           measurement CSV download
///   GET /weather/<kind>       weather chart PNG (temperature|humidity|wind|precipitation)

use std::error::Error;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rocket::http::{ContentType, Status};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{get, routes, State};
use serde::Serialize;

use crate::alert::thresholds::assess_level;
use crate::analysis::groupings::latest_per_location;
use crate::analysis::summary::{field_stats, FieldStats};
use crate::chart;
use crate::config::AqmonConfig;
use crate::export;
use crate::forecast::{make_forecast, ForecastPoint};
use crate::ingest::openaq;
use crate::logging::{self, DataSource};
use crate::model::{AirMeasurement, WeatherObservation};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

pub struct ServerState {
    pub config: AqmonConfig,
    pub measurements: Vec<AirMeasurement>,
    pub weather: Option<Vec<WeatherObservation>>,
}

/// Builds the server state: weather from the CSV the fetch subcommand
/// writes, measurements from a live fetch with the bundled sample as the
/// offline fallback.
pub fn load_state(config: AqmonConfig) -> ServerState {
    let weather_path = Path::new(&config.paths.weather_csv);
    let weather = if weather_path.exists() {
        match export::load_weather_csv(weather_path) {
            Ok(observations) => {
                logging::info(
                    DataSource::System,
                    None,
                    &format!("loaded {} weather rows from {}", observations.len(), config.paths.weather_csv),
                );
                Some(observations)
            }
            Err(e) => {
                logging::error(
                    DataSource::System,
                    None,
                    &format!("failed to read {}: {}", config.paths.weather_csv, e),
                );
                None
            }
        }
    } else {
        logging::warn(
            DataSource::System,
            None,
            &format!("{} not found; weather endpoints disabled (run fetch-weather)", config.paths.weather_csv),
        );
        None
    };

    let live_fetch = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(|e| Box::new(e) as Box<dyn Error>)
        .and_then(|client| {
            openaq::fetch_measurements(
                &client,
                &config.query.city,
                &config.query.parameter,
                config.query.limit,
            )
        });

    let measurements = match live_fetch {
        Ok(readings) => {
            logging::info(
                DataSource::OpenAq,
                Some(&config.query.city),
                &format!("loaded {} live measurements", readings.len()),
            );
            readings
        }
        Err(e) => {
            logging::log_openaq_failure(&config.query.city, "startup fetch", e.as_ref());
            match export::load_measurements_csv(
                Path::new(&config.paths.sample_csv),
                &config.query.parameter,
            ) {
                Ok(readings) => {
                    logging::warn(
                        DataSource::System,
                        None,
                        &format!("falling back to {} sample readings from {}", readings.len(), config.paths.sample_csv),
                    );
                    readings
                }
                Err(e) => {
                    logging::error(
                        DataSource::System,
                        None,
                        &format!("sample fallback failed: {}", e),
                    );
                    Vec::new()
                }
            }
        }
    };

    ServerState {
        config,
        measurements,
        weather,
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ServiceInfo {
    message: &'static str,
}

#[derive(Serialize)]
struct AirStatsResponse {
    city: String,
    parameter: String,
    #[serde(flatten)]
    stats: FieldStats,
}

#[derive(Serialize)]
struct AlertRow {
    location: String,
    parameter: String,
    value: f64,
    datetime: String,
    status: String,
    color: String,
    message: String,
}

fn unavailable(message: impl Into<String>) -> Custom<String> {
    Custom(Status::ServiceUnavailable, message.into())
}

fn png_file(path: &PathBuf) -> Result<(ContentType, Vec<u8>), Custom<String>> {
    std::fs::read(path)
        .map(|bytes| (ContentType::PNG, bytes))
        .map_err(|e| unavailable(format!("chart file unreadable: {}", e)))
}

fn chart_path(state: &ServerState, file_name: &str) -> Result<PathBuf, Custom<String>> {
    let dir = Path::new(&state.config.paths.charts_dir);
    std::fs::create_dir_all(dir)
        .map_err(|e| unavailable(format!("cannot create charts dir: {}", e)))?;
    Ok(dir.join(file_name))
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

#[get("/")]
fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "aqmon service is running!",
    })
}

#[get("/air/stats")]
fn air_stats(state: &State<ServerState>) -> Result<Json<AirStatsResponse>, Custom<String>> {
    let latest = latest_per_location(&state.measurements);
    let bbox = state.config.stats.bounding_box();
    match field_stats(&latest, bbox.as_ref()) {
        Some(stats) => Ok(Json(AirStatsResponse {
            city: state.config.query.city.clone(),
            parameter: state.config.query.parameter.clone(),
            stats,
        })),
        None => Err(unavailable("no measurement data loaded")),
    }
}

#[get("/air/alerts")]
fn air_alerts(state: &State<ServerState>) -> Json<Vec<AlertRow>> {
    let rows = latest_per_location(&state.measurements)
        .iter()
        .map(|reading| {
            let assessment = assess_level(&reading.parameter, reading.value);
            let (status, color) = match assessment.severity {
                Some(severity) => (severity.label().to_string(), severity.color().to_string()),
                None => ("No data".to_string(), "grey".to_string()),
            };
            AlertRow {
                location: reading.location.clone(),
                parameter: reading.parameter.clone(),
                value: reading.value,
                datetime: reading.datetime.clone(),
                status,
                color,
                message: assessment.message,
            }
        })
        .collect();
    Json(rows)
}

#[get("/air/forecast")]
fn air_forecast(state: &State<ServerState>) -> Result<Json<Vec<ForecastPoint>>, Custom<String>> {
    make_forecast(&state.measurements, state.config.query.forecast_hours)
        .map(Json)
        .map_err(|e| unavailable(e.to_string()))
}

#[get("/air/chart")]
fn air_chart(state: &State<ServerState>) -> Result<(ContentType, Vec<u8>), Custom<String>> {
    let forecast = make_forecast(&state.measurements, state.config.query.forecast_hours)
        .map_err(|e| unavailable(e.to_string()))?;
    let unit = state
        .measurements
        .last()
        .map(|r| r.unit.clone())
        .unwrap_or_else(|| "µg/m³".to_string());

    let path = chart_path(state, "series_forecast.png")?;
    chart::render_series_with_forecast(
        &path,
        &state.config.query.parameter,
        &unit,
        &state.measurements,
        &forecast,
    )
    .map_err(|e| unavailable(e.to_string()))?;
    png_file(&path)
}

#[get("/air/map")]
fn air_map(state: &State<ServerState>) -> Result<(ContentType, Vec<u8>), Custom<String>> {
    let latest = latest_per_location(&state.measurements);
    let path = chart_path(state, "station_map.png")?;
    chart::render_station_map(&path, &state.config.query.parameter, &latest)
        .map_err(|e| unavailable(e.to_string()))?;
    png_file(&path)
}

#[get("/air/export")]
fn air_export(state: &State<ServerState>) -> Result<(ContentType, String), Custom<String>> {
    if state.measurements.is_empty() {
        return Err(unavailable("no measurement data to export"));
    }
    export::measurements_to_csv_string(&state.measurements)
        .map(|csv| (ContentType::CSV, csv))
        .map_err(|e| unavailable(e.to_string()))
}

#[get("/weather/<kind>")]
fn weather_chart(
    kind: &str,
    state: &State<ServerState>,
) -> Result<(ContentType, Vec<u8>), Custom<String>> {
    let chart_kind = chart::WeatherChartKind::from_name(kind)
        .ok_or_else(|| Custom(Status::NotFound, format!("unknown weather chart '{}'", kind)))?;

    let observations = state
        .weather
        .as_ref()
        .ok_or_else(|| unavailable("weather_data.csv not found! Run fetch-weather first."))?;

    let path = chart_path(state, &format!("weather_{}.png", kind))?;
    chart::render_weather_chart(&path, chart_kind, observations)
        .map_err(|e| unavailable(e.to_string()))?;
    png_file(&path)
}

// ---------------------------------------------------------------------------
// Server launch
// ---------------------------------------------------------------------------

/// Launches the HTTP service and blocks until shutdown.
pub fn run_server(state: ServerState) -> Result<(), Box<dyn Error>> {
    let rocket_config = rocket::Config {
        port: state.config.server.port,
        address: Ipv4Addr::new(0, 0, 0, 0).into(),
        ..rocket::Config::release_default()
    };

    println!(
        "aqmon service listening on http://{}:{}",
        rocket_config.address, rocket_config.port
    );

    let runtime = rocket::tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let _ = rocket::custom(&rocket_config)
            .mount(
                "/",
                routes![
                    index,
                    air_stats,
                    air_alerts,
                    air_forecast,
                    air_chart,
                    air_map,
                    air_export,
                    weather_chart
                ],
            )
            .manage(state)
            .launch()
            .await?;
        Ok::<(), rocket::Error>(())
    })?;

    Ok(())
}
