//! Air quality and weather monitoring service.
//!
//! Fetches ground-station measurements from OpenAQ and hourly forecasts
//! from Open-Meteo, classifies readings against WHO-like guidelines,
//! projects baseline forecasts, renders charts and a station map, and
//! serves the derived products over HTTP. Fetched series can be archived
//! to PostgreSQL and replayed in development mode.

pub mod alert;
pub mod analysis;
pub mod chart;
pub mod config;
pub mod db;
pub mod dev_mode;
pub mod export;
pub mod forecast;
pub mod ingest;
pub mod locations;
pub mod logging;
pub mod model;
pub mod pollutants;
pub mod verify;
pub mod web;
