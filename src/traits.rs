//! Core domain types and collaborator traits for the route planner.
//!
//! The planner never performs network I/O itself. Geocoding, matrix,
//! directions and weather lookups are capabilities injected by the caller;
//! concrete HTTP adapters live in `osrm`, `weather` and `nominatim`.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::polyline::Polyline;

/// A longitude/latitude pair.
///
/// Longitude always comes first, matching GeoJSON. Serialized as `[lon, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coordinate: Coordinate) -> Self {
        [coordinate.lon, coordinate.lat]
    }
}

/// Pairwise travel durations (seconds) and distances (kilometers).
///
/// Both tables are indexed by the order of the coordinates the matrix was
/// requested for. The diagonal is not assumed to be zero and the tables need
/// not be symmetric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceDurationMatrix {
    pub durations: Vec<Vec<f64>>,
    pub distances: Vec<Vec<f64>>,
}

impl DistanceDurationMatrix {
    pub fn new(durations: Vec<Vec<f64>>, distances: Vec<Vec<f64>>) -> Self {
        Self {
            durations,
            distances,
        }
    }

    /// Number of locations covered by the duration table.
    pub fn size(&self) -> usize {
        self.durations.len()
    }

    /// True when both tables are square, the same size and non-empty.
    pub fn is_well_formed(&self) -> bool {
        let n = self.durations.len();
        n > 0
            && self.distances.len() == n
            && self.durations.iter().all(|row| row.len() == n)
            && self.distances.iter().all(|row| row.len() == n)
    }

    pub fn duration(&self, from: usize, to: usize) -> f64 {
        self.durations[from][to]
    }

    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances[from][to]
    }
}

/// One turn-by-turn step of a routed leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub instruction: String,
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
}

/// A routed leg between two coordinates, as returned by a directions lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub geometry: Polyline,
    pub distance_km: f64,
    /// Traffic-free travel time in seconds.
    pub base_duration_seconds: f64,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub event: String,
    pub description: String,
    pub start: String,
    pub end: String,
}

/// Current weather at a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub condition: String,
    pub description: String,
    pub icon: String,
    pub icon_url: String,
    /// Degrees Celsius, rounded.
    pub temp: i32,
    pub feels_like: i32,
    pub humidity: u8,
    pub wind_speed: f64,
    pub location_name: String,
    /// Local `HH:MM` the snapshot was taken.
    pub updated_at: String,
    #[serde(default)]
    pub alerts: Vec<WeatherAlert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedAddress {
    pub coordinate: Coordinate,
    pub formatted_address: String,
}

/// Provides a distance/duration matrix for a set of coordinates.
///
/// The matrix is indexed by the provided coordinate order.
pub trait MatrixProvider {
    fn matrix_for(&self, coordinates: &[Coordinate]) -> Result<DistanceDurationMatrix, ProviderError>;
}

/// Routes a single leg between two coordinates.
pub trait DirectionsProvider {
    fn route_leg(&self, from: Coordinate, to: Coordinate) -> Result<RouteLeg, ProviderError>;
}

/// Looks up current weather; `None` when no snapshot is available.
pub trait WeatherProvider {
    fn weather_at(&self, coordinate: Coordinate) -> Option<WeatherSnapshot>;
}

/// Resolves a free-form address; `Ok(None)` when nothing matches.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, ProviderError>;
}

/// Weather provider that never returns a snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWeather;

impl WeatherProvider for NoWeather {
    fn weather_at(&self, _coordinate: Coordinate) -> Option<WeatherSnapshot> {
        None
    }
}
