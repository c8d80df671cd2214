//! Great-circle distance and the haversine matrix provider.
//!
//! Used as the straight-line fallback when a leg cannot be routed, and as an
//! offline matrix source. Less accurate than a road network but always
//! available.

use crate::error::ProviderError;
use crate::traits::{Coordinate, DistanceDurationMatrix, MatrixProvider};

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometers.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Haversine-based distance/duration matrix provider.
///
/// Durations assume a constant average speed.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineMatrix {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Convert distance in km to travel time in seconds.
    fn km_to_seconds(&self, km: f64) -> f64 {
        (km / self.speed_kmh * 3600.0).round()
    }
}

impl MatrixProvider for HaversineMatrix {
    fn matrix_for(&self, coordinates: &[Coordinate]) -> Result<DistanceDurationMatrix, ProviderError> {
        let n = coordinates.len();
        let mut durations = vec![vec![0.0; n]; n];
        let mut distances = vec![vec![0.0; n]; n];

        for (i, from) in coordinates.iter().enumerate() {
            for (j, to) in coordinates.iter().enumerate() {
                if i != j {
                    let km = haversine_km(*from, *to);
                    distances[i][j] = km;
                    durations[i][j] = self.km_to_seconds(km);
                }
            }
        }

        Ok(DistanceDurationMatrix::new(durations, distances))
    }
}
