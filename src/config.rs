//! Adapter configuration from the environment.
//!
//! Recognized keys: `OSRM_BASE_URL`, `OSRM_PROFILE`, `WEATHER_API_KEY`,
//! `WEATHER_API_URL`, `NOMINATIM_URL`, `PROVIDER_TIMEOUT_SECS`,
//! `PROVIDER_MAX_RETRIES`. Unset keys keep their defaults.

use std::str::FromStr;

use crate::error::ConfigError;
use crate::nominatim::NominatimConfig;
use crate::osrm::OsrmConfig;
use crate::weather::WeatherConfig;

#[derive(Debug, Clone, Default)]
pub struct PlannerConfig {
    pub osrm: OsrmConfig,
    pub weather: WeatherConfig,
    pub nominatim: NominatimConfig,
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("OSRM_BASE_URL") {
            config.osrm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(profile) = lookup("OSRM_PROFILE") {
            config.osrm.profile = profile;
        }
        if let Some(key) = lookup("WEATHER_API_KEY") {
            config.weather.api_key = key;
        }
        if let Some(url) = lookup("WEATHER_API_URL") {
            config.weather.base_url = url;
        }
        if let Some(url) = lookup("NOMINATIM_URL") {
            config.nominatim.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(timeout) = parse(&lookup, "PROVIDER_TIMEOUT_SECS")? {
            config.osrm.timeout_secs = timeout;
            config.weather.timeout_secs = timeout;
            config.nominatim.timeout_secs = timeout;
        }
        if let Some(attempts) = parse(&lookup, "PROVIDER_MAX_RETRIES")? {
            config.osrm.retry.max_attempts = attempts;
            config.weather.retry.max_attempts = attempts;
            config.nominatim.retry.max_attempts = attempts;
        }

        Ok(config)
    }
}

fn parse<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    match value.trim().parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::Invalid {
            key: key.to_string(),
            value,
        }),
    }
}
