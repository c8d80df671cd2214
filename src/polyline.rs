//! Polyline representation for segment geometries.
//!
//! Geometries are kept as decoded coordinate sequences in lon/lat order.
//! Encoding to a compact wire format is left to whoever serializes a route.

use serde::{Deserialize, Serialize};

use crate::haversine::haversine_km;
use crate::traits::Coordinate;

/// Ordered coordinates tracing the path of one leg.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// The straight line between two endpoints, used when no routed path exists.
    pub fn straight(from: Coordinate, to: Coordinate) -> Self {
        Self {
            points: vec![from, to],
        }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn first(&self) -> Option<Coordinate> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Coordinate> {
        self.points.last().copied()
    }

    /// Sum of great-circle distances between consecutive points, in km.
    pub fn length_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| haversine_km(pair[0], pair[1]))
            .sum()
    }
}
