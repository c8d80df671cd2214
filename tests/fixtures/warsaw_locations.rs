//! Delivery stops around Warsaw for realistic test fixtures.
//!
//! Coordinates are approximate street addresses, longitude first.

use courier_route_planner::traits::Coordinate;

/// A named stop with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lon: f64,
    pub lat: f64,
}

impl Location {
    pub const fn new(name: &'static str, lon: f64, lat: f64) -> Self {
        Self { name, lon, lat }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lon, self.lat)
    }
}

// ============================================================================
// Depots (good for start locations)
// ============================================================================

pub const DEPOTS: &[Location] = &[
    Location::new("Sortownia Okęcie", 20.9671, 52.1711),
    Location::new("Magazyn Żerań", 21.0031, 52.2940),
];

// ============================================================================
// Delivery stops
// ============================================================================

pub const STOPS: &[Location] = &[
    Location::new("Marszałkowska 104", 21.0109, 52.2330),
    Location::new("Puławska 145", 21.0175, 52.1900),
    Location::new("Grójecka 79", 20.9780, 52.2150),
    Location::new("Targowa 72", 21.0440, 52.2540),
    Location::new("Grochowska 227", 21.0880, 52.2470),
    Location::new("Żelazna 59", 20.9890, 52.2350),
    Location::new("Kasprowicza 18", 20.9530, 52.2880),
    Location::new("Wołoska 12", 21.0010, 52.1870),
    Location::new("KEN 36", 21.0490, 52.1450),
    Location::new("Modlińska 6", 21.0020, 52.3120),
    Location::new("Górczewska 124", 20.9240, 52.2390),
    Location::new("Jagiellońska 56", 21.0190, 52.2720),
];

pub fn depot() -> Coordinate {
    DEPOTS[0].coordinate()
}

/// The first `count` stops as coordinates.
pub fn stops(count: usize) -> Vec<Coordinate> {
    STOPS.iter().take(count).map(Location::coordinate).collect()
}
