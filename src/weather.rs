//! OpenWeatherMap current-weather adapter.

use chrono::{Local, TimeZone};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::http::{RetryPolicy, send_with_retry};
use crate::traits::{Coordinate, WeatherAlert, WeatherProvider, WeatherSnapshot};

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: String,
    /// `metric` gives Celsius and m/s.
    pub units: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            api_key: String::new(),
            units: "metric".to_string(),
            timeout_secs: 10,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    config: WeatherConfig,
    client: reqwest::blocking::Client,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Fetch current weather, surfacing the failure reason.
    pub fn fetch(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, ProviderError> {
        debug!(lon = coordinate.lon, lat = coordinate.lat, "weather request");
        let lat = coordinate.lat.to_string();
        let lon = coordinate.lon.to_string();

        let response = send_with_retry(&self.config.retry, || {
            self.client.get(&self.config.base_url).query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.config.api_key.as_str()),
                ("units", self.config.units.as_str()),
            ])
        })?;

        let body: OwmResponse = response.json()?;
        snapshot_from_response(body, Local::now().format("%H:%M").to_string())
    }
}

impl WeatherProvider for WeatherClient {
    fn weather_at(&self, coordinate: Coordinate) -> Option<WeatherSnapshot> {
        match self.fetch(coordinate) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(error = %err, "weather lookup failed");
                None
            }
        }
    }
}

fn snapshot_from_response(body: OwmResponse, updated_at: String) -> Result<WeatherSnapshot, ProviderError> {
    let current = body
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Malformed("empty weather list".to_string()))?;

    let alerts = body
        .alerts
        .unwrap_or_default()
        .into_iter()
        .map(|alert| WeatherAlert {
            event: alert.event,
            description: alert.description,
            start: format_epoch(alert.start),
            end: format_epoch(alert.end),
        })
        .collect();

    Ok(WeatherSnapshot {
        icon_url: format!("https://openweathermap.org/img/wn/{}@2x.png", current.icon),
        condition: current.main,
        description: current.description,
        icon: current.icon,
        temp: body.main.temp.round() as i32,
        feels_like: body.main.feels_like.round() as i32,
        humidity: body.main.humidity,
        wind_speed: body.wind.speed,
        location_name: body.name,
        updated_at,
        alerts,
    })
}

fn format_epoch(seconds: i64) -> String {
    Local
        .timestamp_opt(seconds, 0)
        .single()
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    weather: Vec<OwmCondition>,
    main: OwmMain,
    wind: OwmWind,
    #[serde(default)]
    name: String,
    alerts: Option<Vec<OwmAlert>>,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmAlert {
    event: String,
    description: String,
    start: i64,
    end: i64,
}
