//! aqmon service entry point.
//!
//! Subcommands:
//!   monitor        fetch the configured city/parameter, report metrics,
//!                  alerts and forecast, render charts, archive if a
//!                  database is configured
//!   serve          run the HTTP service
//!   verify         check every registry city against the live APIs
//!   fetch-weather  fetch the Open-Meteo hourly forecast and write the CSV
//!   analyze        Holt-Winters decomposition over the bundled sample
//!   replay <days>  run the monitor report against archived data

use std::env;
use std::path::Path;
use std::process::exit;
use std::time::Duration;

use aqmon_service::alert::staleness::is_stale;
use aqmon_service::alert::thresholds::{assess_level, check_threshold};
use aqmon_service::analysis::groupings::latest_per_location;
use aqmon_service::analysis::smoothing::HoltWinters;
use aqmon_service::analysis::summary::{daily_means, field_stats, summarize};
use aqmon_service::chart;
use aqmon_service::config::{load_config, AqmonConfig, DEFAULT_CONFIG_PATH};
use aqmon_service::db;
use aqmon_service::dev_mode::DevMode;
use aqmon_service::export;
use aqmon_service::forecast::make_forecast;
use aqmon_service::ingest::{openaq, openmeteo};
use aqmon_service::locations;
use aqmon_service::logging::{self, DataSource, LogLevel};
use aqmon_service::model::AirMeasurement;
use aqmon_service::verify;
use aqmon_service::web;

fn main() {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("monitor");

    let config = match load_config(Path::new(DEFAULT_CONFIG_PATH)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}", DEFAULT_CONFIG_PATH, e);
            exit(1);
        }
    };

    logging::init_logger(LogLevel::Info, None, false);

    let result = match command {
        "monitor" => run_monitor(&config),
        "serve" => web::run_server(web::load_state(config)),
        "verify" => run_verify(),
        "fetch-weather" => run_fetch_weather(&config, args.get(2).map(String::as_str)),
        "analyze" => run_analyze(&config),
        "replay" => match args.get(2).and_then(|d| d.parse::<i64>().ok()) {
            Some(days) => run_replay(&config, days),
            None => {
                eprintln!("Usage: aqmon_service replay <days-offset>");
                exit(2);
            }
        },
        "help" | "--help" | "-h" => {
            print_usage();
            return;
        }
        other => {
            eprintln!("Unknown command '{}'\n", other);
            print_usage();
            exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

fn print_usage() {
    println!("Usage: aqmon_service <command>");
    println!();
    println!("Commands:");
    println!("  monitor          fetch, classify and report the configured city (default)");
    println!("  serve            run the HTTP service");
    println!("  verify           check registry cities against the live APIs");
    println!("  fetch-weather    fetch the Open-Meteo forecast and write the weather CSV");
    println!("  analyze          exponential smoothing over the bundled sample");
    println!("  replay <days>    monitor report from the archive, <days> days back");
    println!();
    println!("Configuration is read from {} when present.", DEFAULT_CONFIG_PATH);
}

// ---------------------------------------------------------------------------
// monitor
// ---------------------------------------------------------------------------

fn run_monitor(config: &AqmonConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()?;

    let city = &config.query.city;
    let parameter = &config.query.parameter;

    println!("Fetching {} {} measurements...", city, parameter);
    let readings =
        match openaq::fetch_measurements(&client, city, parameter, config.query.limit) {
            Ok(readings) => readings,
            Err(e) => {
                logging::log_openaq_failure(city, "fetch_measurements", e.as_ref());
                return Err(e);
            }
        };

    report(config, &readings)?;

    // Archive when a database is configured; its absence is not an error.
    if env::var("DATABASE_URL").is_ok() || Path::new(".env").exists() {
        match db::connect_and_verify(&["aqmon_raw"]) {
            Ok(mut db_client) => {
                let inserted = db::insert_measurements(&mut db_client, &readings)?;
                logging::info(
                    DataSource::Database,
                    Some(city),
                    &format!("archived {} new readings", inserted),
                );
            }
            Err(e) => {
                logging::warn(
                    DataSource::Database,
                    None,
                    &format!("archive skipped: {}", e),
                );
            }
        }
    }

    Ok(())
}

/// The dashboard report: metrics row, freshness, alert card, per-station
/// alerts, baseline forecast, charts, CSV export.
fn report(config: &AqmonConfig, readings: &[AirMeasurement]) -> Result<(), Box<dyn std::error::Error>> {
    let city = &config.query.city;
    let parameter = &config.query.parameter;

    let metrics = summarize(readings);
    println!();
    println!("── {} {} ──", city, parameter.to_uppercase());
    match (metrics.latest, metrics.unit.as_deref()) {
        (Some(latest), Some(unit)) => println!("Latest:   {:.1} {}", latest, unit),
        _ => println!("Latest:   —"),
    }
    match metrics.avg_24h {
        Some(avg) => println!("24h avg:  {:.1}", avg),
        None => println!("24h avg:  —"),
    }
    match metrics.max_24h {
        Some(max) => println!("24h max:  {:.1}", max),
        None => println!("24h max:  —"),
    }

    if let Some(latest) = readings.last() {
        match is_stale(latest, config.query.max_age_minutes) {
            Ok(true) => logging::warn(
                DataSource::OpenAq,
                Some(city),
                &format!(
                    "latest reading ({}) is older than {} minutes",
                    latest.datetime, config.query.max_age_minutes
                ),
            ),
            Ok(false) => {}
            Err(e) => logging::warn(DataSource::OpenAq, Some(city), &e),
        }

        let assessment = assess_level(parameter, latest.value);
        let status = assessment
            .severity
            .map(|s| s.label())
            .unwrap_or("No data");
        println!("Status:   {} — {}", status, assessment.message);
    }

    let latest_stations = latest_per_location(readings);
    let alerts: Vec<_> = latest_stations
        .iter()
        .filter_map(check_threshold)
        .collect();
    if alerts.is_empty() {
        println!("\nNo stations above guideline.");
    } else {
        println!("\nStations above guideline:");
        for alert in &alerts {
            println!("  [{}] {} — {}", alert.severity.label(), alert.location, alert.message);
        }
    }

    if let Some(stats) = field_stats(&latest_stations, config.stats.bounding_box().as_ref()) {
        println!(
            "\nField stats ({} stations): mean {:.1}, max {:.1}, min {:.1}",
            stats.count, stats.mean, stats.max, stats.min
        );
    }

    let forecast = make_forecast(readings, config.query.forecast_hours)?;
    if !forecast.is_empty() {
        println!("\nBaseline forecast ({}h):", config.query.forecast_hours);
        for point in &forecast {
            println!(
                "  {}  persistence {:.1}  rolling {:.1}",
                point.datetime, point.persistence, point.rolling
            );
        }
    }

    // Charts + export
    let charts_dir = Path::new(&config.paths.charts_dir);
    std::fs::create_dir_all(charts_dir)?;

    let unit = readings
        .last()
        .map(|r| r.unit.clone())
        .unwrap_or_else(|| "µg/m³".to_string());
    let series_path = charts_dir.join("series_forecast.png");
    match chart::render_series_with_forecast(&series_path, parameter, &unit, readings, &forecast) {
        Ok(()) => println!("\nChart written to {}", series_path.display()),
        Err(e) => logging::warn(DataSource::System, None, &format!("series chart skipped: {}", e)),
    }

    let map_path = charts_dir.join("station_map.png");
    match chart::render_station_map(&map_path, parameter, &latest_stations) {
        Ok(()) => println!("Map written to {}", map_path.display()),
        Err(e) => logging::warn(DataSource::System, None, &format!("station map skipped: {}", e)),
    }

    let export_name = format!(
        "{}_{}_data.csv",
        city.to_lowercase().replace(' ', "_"),
        parameter
    );
    let export_path = charts_dir.join(export_name);
    export::save_measurements_csv(&export_path, readings)?;
    println!("Export written to {}", export_path.display());

    Ok(())
}

// ---------------------------------------------------------------------------
// verify
// ---------------------------------------------------------------------------

fn run_verify() -> Result<(), Box<dyn std::error::Error>> {
    let report = verify::run_full_verification()?;
    verify::print_summary(&report);

    let report_path = "verification_report.json";
    std::fs::write(report_path, serde_json::to_string_pretty(&report)?)?;
    println!("Report written to {}", report_path);
    Ok(())
}

// ---------------------------------------------------------------------------
// fetch-weather
// ---------------------------------------------------------------------------

fn run_fetch_weather(
    config: &AqmonConfig,
    city_arg: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    // A registry city name overrides the configured coordinate.
    let (name, latitude, longitude) = match city_arg {
        Some(name) => match locations::find_city(name) {
            Some(city) => (city.name.to_string(), city.latitude, city.longitude),
            None => {
                return Err(format!(
                    "'{}' is not in the city registry (known: {})",
                    name,
                    locations::all_city_names().join(", ")
                )
                .into());
            }
        },
        None => (
            config.weather.name.clone(),
            config.weather.latitude,
            config.weather.longitude,
        ),
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()?;

    println!("Fetching hourly forecast for {} ({}, {})...", name, latitude, longitude);
    let observations = match openmeteo::fetch_hourly(&client, latitude, longitude) {
        Ok(observations) => observations,
        Err(e) => {
            logging::log_openmeteo_failure(&name, "fetch_hourly", e.as_ref());
            return Err(e);
        }
    };

    println!("First rows of weather data:");
    for obs in observations.iter().take(10) {
        println!(
            "  {}  {:>6} °C  {:>5} %  {:>5} m/s  {:>5} mm",
            obs.time,
            obs.temperature_c.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "—".into()),
            obs.relative_humidity_pct.map(|v| format!("{:.0}", v)).unwrap_or_else(|| "—".into()),
            obs.wind_speed_ms.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "—".into()),
            obs.precipitation_mm.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "—".into()),
        );
    }

    let path = Path::new(&config.paths.weather_csv);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    export::save_weather_csv(path, &observations)?;
    println!("Weather data saved to {}", path.display());

    if openmeteo::detect_rainfall_event(&observations, 10.0) {
        println!(
            "Note: {:.1} mm cumulative precipitation in the forecast window.",
            openmeteo::calculate_cumulative_precip(&observations)
        );
    }

    if env::var("DATABASE_URL").is_ok() || Path::new(".env").exists() {
        match db::connect_and_verify(&["aqmon_raw"]) {
            Ok(mut db_client) => {
                let inserted =
                    db::insert_weather_observations(&mut db_client, &name, &observations)?;
                logging::info(
                    DataSource::Database,
                    Some(&name),
                    &format!("archived {} new weather rows", inserted),
                );
            }
            Err(e) => {
                logging::warn(DataSource::Database, None, &format!("archive skipped: {}", e));
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

fn run_analyze(config: &AqmonConfig) -> Result<(), Box<dyn std::error::Error>> {
    let sample_path = Path::new(&config.paths.sample_csv);
    println!("Using local sample {} for analysis.", sample_path.display());

    let readings = export::load_measurements_csv(sample_path, &config.query.parameter)?;
    let daily = daily_means(&readings);
    println!(
        "{} readings over {} days after daily-mean resampling.",
        readings.len(),
        daily.len()
    );

    let values: Vec<f64> = daily.iter().map(|(_, v)| *v).collect();
    let model = HoltWinters::weekly();
    let fit = model.fit(&values)?;

    println!();
    println!("Exponential smoothing (additive trend + weekly seasonality):");
    println!("  level:  {:.2}", fit.level);
    println!("  trend:  {:+.3} per day", fit.trend);
    println!("  rmse:   {:.2}", fit.rmse());
    println!("  7-day forecast:");
    for (i, value) in fit.forecast(7).iter().enumerate() {
        println!("    day +{}: {:.1}", i + 1, value);
    }

    let charts_dir = Path::new(&config.paths.charts_dir);
    std::fs::create_dir_all(charts_dir)?;
    let fit_path = charts_dir.join("daily_fit.png");
    chart::render_daily_fit(&fit_path, &config.query.parameter, &daily, &fit.fitted)?;
    println!("Fit chart written to {}", fit_path.display());

    Ok(())
}

// ---------------------------------------------------------------------------
// replay
// ---------------------------------------------------------------------------

fn run_replay(config: &AqmonConfig, days_offset: i64) -> Result<(), Box<dyn std::error::Error>> {
    let mut db_client = db::connect_and_verify(&["aqmon_raw"])?;

    let city = &config.query.city;
    let parameter = &config.query.parameter;

    if let Some((start, end)) = DevMode::get_data_range(&mut db_client, city, parameter)? {
        println!("Archive covers {} .. {}", start, end);
    } else {
        return Err(format!("no archived data for {} {}", city, parameter).into());
    }

    let dev = DevMode::new(days_offset);
    let readings = dev.fetch_simulated_current_readings(&mut db_client, city, parameter)?;
    if readings.is_empty() {
        return Err(format!(
            "no archived readings within the replay window {} days back",
            days_offset
        )
        .into());
    }

    println!(
        "Replaying {} readings as if current ({} days back).",
        readings.len(),
        days_offset
    );
    report(config, &readings)
}
