//! Nominatim geocoding adapter.

use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::http::{RetryPolicy, send_with_retry};
use crate::traits::{Coordinate, GeocodedAddress, Geocoder};

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying agent.
    pub user_agent: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("courier-route-planner/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl Geocoder for NominatimClient {
    fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, ProviderError> {
        debug!(address, "geocode request");
        let url = format!("{}/search", self.config.base_url);
        let response = send_with_retry(&self.config.retry, || {
            self.client
                .get(&url)
                .query(&[("q", address), ("format", "json"), ("limit", "1")])
        })?;

        let results: Vec<NominatimResult> = response.json()?;
        first_match(results)
    }
}

fn first_match(results: Vec<NominatimResult>) -> Result<Option<GeocodedAddress>, ProviderError> {
    let Some(result) = results.into_iter().next() else {
        return Ok(None);
    };

    let lat: f64 = result
        .lat
        .parse()
        .map_err(|_| ProviderError::Malformed(format!("invalid latitude {:?}", result.lat)))?;
    let lon: f64 = result
        .lon
        .parse()
        .map_err(|_| ProviderError::Malformed(format!("invalid longitude {:?}", result.lon)))?;

    Ok(Some(GeocodedAddress {
        coordinate: Coordinate::new(lon, lat),
        formatted_address: result.display_name,
    }))
}

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}
