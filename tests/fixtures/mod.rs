//! Test fixtures for courier-route-planner.
//!
//! Provides:
//! - Delivery stops around Warsaw
//! - Stub directions, weather and matrix providers with predictable output

#![allow(dead_code)]

pub mod warsaw_locations;

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeZone};

use courier_route_planner::error::ProviderError;
use courier_route_planner::polyline::Polyline;
use courier_route_planner::traits::{
    Coordinate, DirectionsProvider, DistanceDurationMatrix, Instruction, MatrixProvider, RouteLeg,
    WeatherProvider, WeatherSnapshot,
};

// ============================================================================
// Clock
// ============================================================================

/// Wednesday 2024-03-13 at `hour:00` local time.
pub fn wednesday_at(hour: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 3, 13, hour, 0, 0)
        .single()
        .expect("unambiguous local time")
}

// ============================================================================
// Directions
// ============================================================================

/// Every lookup fails.
pub struct FailingDirections;

impl DirectionsProvider for FailingDirections {
    fn route_leg(&self, _from: Coordinate, _to: Coordinate) -> Result<RouteLeg, ProviderError> {
        Err(ProviderError::Status(503))
    }
}

/// Routes each leg with a fixed distance and duration, along a three-point path.
pub struct FixedDirections {
    pub distance_km: f64,
    pub base_duration_seconds: f64,
}

impl FixedDirections {
    pub fn new(distance_km: f64, base_duration_seconds: f64) -> Self {
        Self {
            distance_km,
            base_duration_seconds,
        }
    }
}

impl DirectionsProvider for FixedDirections {
    fn route_leg(&self, from: Coordinate, to: Coordinate) -> Result<RouteLeg, ProviderError> {
        let mid = Coordinate::new((from.lon + to.lon) / 2.0, (from.lat + to.lat) / 2.0);
        Ok(RouteLeg {
            geometry: Polyline::new(vec![from, mid, to]),
            distance_km: self.distance_km,
            base_duration_seconds: self.base_duration_seconds,
            instructions: vec![Instruction {
                instruction: "depart".to_string(),
                distance: self.distance_km * 1000.0,
                duration: self.base_duration_seconds,
            }],
        })
    }
}

/// Per-leg base durations for a known coordinate sequence. Legs not in the
/// sequence, or marked `None`, fail.
pub struct ScriptedDirections {
    pub coordinates: Vec<Coordinate>,
    pub durations: Vec<Option<f64>>,
}

impl DirectionsProvider for ScriptedDirections {
    fn route_leg(&self, from: Coordinate, to: Coordinate) -> Result<RouteLeg, ProviderError> {
        let index = self
            .coordinates
            .windows(2)
            .position(|pair| pair[0] == from && pair[1] == to)
            .ok_or(ProviderError::NotFound)?;
        let duration = self.durations[index].ok_or(ProviderError::Status(500))?;

        Ok(RouteLeg {
            geometry: Polyline::straight(from, to),
            distance_km: 5.0,
            base_duration_seconds: duration,
            instructions: Vec::new(),
        })
    }
}

// ============================================================================
// Weather
// ============================================================================

/// Returns a snapshot named after the coordinate and records every request.
#[derive(Default)]
pub struct RecordingWeather {
    pub requested: Mutex<Vec<Coordinate>>,
}

impl RecordingWeather {
    pub fn requested(&self) -> Vec<Coordinate> {
        self.requested.lock().expect("weather log").clone()
    }
}

pub fn snapshot(location_name: &str) -> WeatherSnapshot {
    WeatherSnapshot {
        condition: "Clouds".to_string(),
        description: "overcast clouds".to_string(),
        icon: "04d".to_string(),
        icon_url: "https://openweathermap.org/img/wn/04d@2x.png".to_string(),
        temp: 9,
        feels_like: 7,
        humidity: 70,
        wind_speed: 3.2,
        location_name: location_name.to_string(),
        updated_at: "08:00".to_string(),
        alerts: Vec::new(),
    }
}

impl WeatherProvider for RecordingWeather {
    fn weather_at(&self, coordinate: Coordinate) -> Option<WeatherSnapshot> {
        self.requested.lock().expect("weather log").push(coordinate);
        Some(snapshot(&format!("{:.4},{:.4}", coordinate.lon, coordinate.lat)))
    }
}

// ============================================================================
// Matrices
// ============================================================================

/// Matrix lookups always fail.
pub struct FailingMatrix;

impl MatrixProvider for FailingMatrix {
    fn matrix_for(&self, _coordinates: &[Coordinate]) -> Result<DistanceDurationMatrix, ProviderError> {
        Err(ProviderError::RateLimited { attempts: 3 })
    }
}

/// Manhattan distance on degrees (1 degree = 100 km, 1 km = 60 s).
pub struct ManhattanMatrix;

impl MatrixProvider for ManhattanMatrix {
    fn matrix_for(&self, coordinates: &[Coordinate]) -> Result<DistanceDurationMatrix, ProviderError> {
        let n = coordinates.len();
        let mut durations = vec![vec![0.0; n]; n];
        let mut distances = vec![vec![0.0; n]; n];
        for (i, from) in coordinates.iter().enumerate() {
            for (j, to) in coordinates.iter().enumerate() {
                let km = ((from.lon - to.lon).abs() + (from.lat - to.lat).abs()) * 100.0;
                distances[i][j] = km;
                durations[i][j] = km * 60.0;
            }
        }
        Ok(DistanceDurationMatrix::new(durations, distances))
    }
}

/// Drops the last location from the matrix it returns.
pub struct ShortMatrix;

impl MatrixProvider for ShortMatrix {
    fn matrix_for(&self, coordinates: &[Coordinate]) -> Result<DistanceDurationMatrix, ProviderError> {
        let covered = &coordinates[..coordinates.len().saturating_sub(1)];
        ManhattanMatrix.matrix_for(covered)
    }
}

/// Adds one location beyond the ones requested.
pub struct OversizedMatrix;

impl MatrixProvider for OversizedMatrix {
    fn matrix_for(&self, coordinates: &[Coordinate]) -> Result<DistanceDurationMatrix, ProviderError> {
        let mut padded = coordinates.to_vec();
        padded.push(Coordinate::new(21.5, 52.5));
        ManhattanMatrix.matrix_for(&padded)
    }
}
