//! OSRM HTTP adapter for distance matrices and single-leg directions.

use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::http::{RetryPolicy, send_with_retry};
use crate::polyline::Polyline;
use crate::traits::{Coordinate, DirectionsProvider, DistanceDurationMatrix, Instruction, MatrixProvider, RouteLeg};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn table_url(&self, coordinates: &[Coordinate]) -> String {
        format!(
            "{}/table/v1/{}/{}?annotations=duration,distance",
            self.config.base_url,
            self.config.profile,
            coordinate_path(coordinates)
        )
    }

    pub fn route_url(&self, from: Coordinate, to: Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson&steps=true",
            self.config.base_url,
            self.config.profile,
            coordinate_path(&[from, to])
        )
    }

    fn get<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, ProviderError> {
        debug!(url, "osrm request");
        let response = send_with_retry(&self.config.retry, || self.client.get(url))?;
        Ok(response.json::<T>()?)
    }
}

impl MatrixProvider for OsrmClient {
    fn matrix_for(&self, coordinates: &[Coordinate]) -> Result<DistanceDurationMatrix, ProviderError> {
        if coordinates.is_empty() {
            return Ok(DistanceDurationMatrix::default());
        }

        let body: OsrmTableResponse = self.get(&self.table_url(coordinates))?;
        matrix_from_table(body)
    }
}

impl DirectionsProvider for OsrmClient {
    fn route_leg(&self, from: Coordinate, to: Coordinate) -> Result<RouteLeg, ProviderError> {
        let body: OsrmRouteResponse = self.get(&self.route_url(from, to))?;
        leg_from_route(body)
    }
}

/// `lon,lat;lon,lat;...` as OSRM expects.
fn coordinate_path(coordinates: &[Coordinate]) -> String {
    coordinates
        .iter()
        .map(|c| format!("{:.6},{:.6}", c.lon, c.lat))
        .collect::<Vec<_>>()
        .join(";")
}

fn matrix_from_table(body: OsrmTableResponse) -> Result<DistanceDurationMatrix, ProviderError> {
    if body.code != "Ok" {
        return Err(ProviderError::Malformed(format!("table code {}", body.code)));
    }

    let durations = complete_table(body.durations, "durations")?;
    let distances = complete_table(body.distances, "distances")?
        .into_iter()
        .map(|row| row.into_iter().map(|meters| meters / 1000.0).collect())
        .collect();

    Ok(DistanceDurationMatrix::new(durations, distances))
}

/// Reject missing tables and unreachable (null) pairs.
fn complete_table(table: Option<Vec<Vec<Option<f64>>>>, name: &str) -> Result<Vec<Vec<f64>>, ProviderError> {
    let table = table.ok_or_else(|| ProviderError::Malformed(format!("missing {}", name)))?;
    table
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|value| value.ok_or_else(|| ProviderError::Malformed(format!("unreachable pair in {}", name))))
                .collect()
        })
        .collect()
}

fn leg_from_route(body: OsrmRouteResponse) -> Result<RouteLeg, ProviderError> {
    if body.code != "Ok" {
        return Err(ProviderError::Malformed(format!("route code {}", body.code)));
    }
    let route = body.routes.into_iter().next().ok_or(ProviderError::NotFound)?;

    let instructions = route
        .legs
        .into_iter()
        .flat_map(|leg| leg.steps)
        .map(|step| Instruction {
            instruction: step.describe(),
            distance: step.distance,
            duration: step.duration,
        })
        .collect();

    Ok(RouteLeg {
        geometry: Polyline::new(route.geometry.coordinates.into_iter().map(Coordinate::from).collect()),
        distance_km: route.distance / 1000.0,
        base_duration_seconds: route.duration,
        instructions,
    })
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    durations: Option<Vec<Vec<Option<f64>>>>,
    distances: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    #[serde(default)]
    steps: Vec<OsrmStep>,
}

#[derive(Debug, Deserialize)]
struct OsrmStep {
    distance: f64,
    duration: f64,
    #[serde(default)]
    name: String,
    maneuver: OsrmManeuver,
}

#[derive(Debug, Deserialize)]
struct OsrmManeuver {
    #[serde(rename = "type")]
    kind: String,
    modifier: Option<String>,
}

impl OsrmStep {
    /// e.g. "turn left onto Marszałkowska".
    fn describe(&self) -> String {
        let mut text = self.maneuver.kind.clone();
        if let Some(modifier) = &self.maneuver.modifier {
            text.push(' ');
            text.push_str(modifier);
        }
        if !self.name.is_empty() {
            text.push_str(" onto ");
            text.push_str(&self.name);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"{
        "code": "Ok",
        "durations": [[0, 120.5], [130.0, 0]],
        "distances": [[0, 1500], [1600, 0]]
    }"#;

    const ROUTE: &str = r#"{
        "code": "Ok",
        "routes": [{
            "distance": 2500.0,
            "duration": 300.0,
            "geometry": {"type": "LineString", "coordinates": [[21.0, 52.2], [21.01, 52.21], [21.02, 52.22]]},
            "legs": [{"steps": [
                {"distance": 2000.0, "duration": 240.0, "name": "Prosta", "maneuver": {"type": "depart"}},
                {"distance": 500.0, "duration": 60.0, "name": "", "maneuver": {"type": "turn", "modifier": "left"}}
            ]}]
        }]
    }"#;

    #[test]
    fn test_table_converts_meters_to_km() {
        let body: OsrmTableResponse = serde_json::from_str(TABLE).unwrap();
        let matrix = matrix_from_table(body).unwrap();
        assert!(matrix.is_well_formed());
        assert_eq!(matrix.duration(0, 1), 120.5);
        assert_eq!(matrix.distance(1, 0), 1.6);
    }

    #[test]
    fn test_table_rejects_unreachable_pair() {
        let body: OsrmTableResponse = serde_json::from_str(
            r#"{"code": "Ok", "durations": [[0, null], [1, 0]], "distances": [[0, 1], [1, 0]]}"#,
        )
        .unwrap();
        assert!(matches!(matrix_from_table(body), Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_table_requires_distances() {
        let body: OsrmTableResponse = serde_json::from_str(r#"{"code": "Ok", "durations": [[0]]}"#).unwrap();
        assert!(matrix_from_table(body).is_err());
    }

    #[test]
    fn test_route_leg_parses_geometry_and_steps() {
        let body: OsrmRouteResponse = serde_json::from_str(ROUTE).unwrap();
        let leg = leg_from_route(body).unwrap();
        assert_eq!(leg.distance_km, 2.5);
        assert_eq!(leg.base_duration_seconds, 300.0);
        assert_eq!(leg.geometry.points().len(), 3);
        assert_eq!(leg.geometry.first(), Some(Coordinate::new(21.0, 52.2)));
        assert_eq!(leg.instructions[0].instruction, "depart onto Prosta");
        assert_eq!(leg.instructions[1].instruction, "turn left");
    }

    #[test]
    fn test_route_without_routes_is_not_found() {
        let body: OsrmRouteResponse = serde_json::from_str(r#"{"code": "Ok", "routes": []}"#).unwrap();
        assert!(matches!(leg_from_route(body), Err(ProviderError::NotFound)));

        let body: OsrmRouteResponse = serde_json::from_str(r#"{"code": "NoRoute"}"#).unwrap();
        assert!(matches!(leg_from_route(body), Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_urls_put_longitude_first() {
        let client = OsrmClient::new(OsrmConfig::default()).unwrap();
        let url = client.route_url(Coordinate::new(21.0, 52.2), Coordinate::new(21.1, 52.3));
        assert_eq!(
            url,
            "http://localhost:5000/route/v1/car/21.000000,52.200000;21.100000,52.300000?overview=full&geometries=geojson&steps=true"
        );
        assert!(client.table_url(&[Coordinate::new(1.0, 2.0)]).ends_with("1.000000,2.000000?annotations=duration,distance"));
    }
}
