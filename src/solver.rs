//! Route sequencer: orders stops to minimize total travel time.
//!
//! Small inputs are solved exactly by enumerating every tour anchored at the
//! start index; larger inputs use a nearest-neighbor heuristic. Both close the
//! tour back at the start.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PlanError;
use crate::format::{format_distance, format_duration};
use crate::traits::{Coordinate, DistanceDurationMatrix, MatrixProvider};

/// Largest input solved by exhaustive search.
pub const EXACT_SEARCH_LIMIT: usize = 8;

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Inputs with at most this many locations are solved exactly.
    pub exact_search_limit: usize,
    /// Index the tour starts and ends at.
    pub start_index: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            exact_search_limit: EXACT_SEARCH_LIMIT,
            start_index: 0,
        }
    }
}

/// An ordered visiting sequence over matrix indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSequence {
    pub indices: Vec<usize>,
    pub total_duration_seconds: f64,
    pub total_distance_km: f64,
    /// `"{h}h {m}m"`.
    pub total_duration: String,
    /// Kilometers, one decimal place.
    pub total_distance: String,
}

impl RouteSequence {
    /// The "no route" sentinel.
    pub fn empty() -> Self {
        Self::from_indices(Vec::new(), 0.0, 0.0)
    }

    fn from_indices(indices: Vec<usize>, duration: f64, distance: f64) -> Self {
        Self {
            indices,
            total_duration_seconds: duration,
            total_distance_km: distance,
            total_duration: format_duration(duration),
            total_distance: format_distance(distance),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// True for a round trip that returns to its first index.
    pub fn is_closed(&self) -> bool {
        self.indices.len() > 2 && self.indices.first() == self.indices.last()
    }

    /// Map indices back onto the coordinates the matrix was built from.
    ///
    /// Indices outside `coordinates` are skipped.
    pub fn ordered(&self, coordinates: &[Coordinate]) -> Vec<Coordinate> {
        self.indices
            .iter()
            .filter_map(|&i| coordinates.get(i).copied())
            .collect()
    }
}

/// The sequenced coordinates together with their sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedRoute {
    pub coordinates: Vec<Coordinate>,
    pub sequence: RouteSequence,
}

/// Order the locations of `matrix` into a tour starting at `options.start_index`.
///
/// Returns [`RouteSequence::empty`] when the matrix is malformed or the start
/// index is out of range.
pub fn sequence(matrix: &DistanceDurationMatrix, options: &SolveOptions) -> RouteSequence {
    if !matrix.is_well_formed() {
        warn!("cannot sequence malformed matrix ({} rows)", matrix.size());
        return RouteSequence::empty();
    }

    let n = matrix.size();
    let start = options.start_index;
    if start >= n {
        warn!(start, n, "start index outside matrix");
        return RouteSequence::empty();
    }

    if n == 1 {
        return RouteSequence::from_indices(vec![start], 0.0, 0.0);
    }

    let indices = if n <= options.exact_search_limit {
        debug!(n, "sequencing with exact search");
        exact_tour(matrix, start)
    } else {
        debug!(n, "sequencing with nearest neighbor");
        nearest_neighbor_tour(matrix, start)
    };

    let duration = path_duration(matrix, &indices);
    let distance = path_distance(matrix, &indices);
    RouteSequence::from_indices(indices, duration, distance)
}

/// Prepend an optional current location, fetch a matrix and sequence the stops.
///
/// This is the one place where a collaborator failure is fatal: without a
/// matrix no order can be computed.
pub fn optimize_route<M: MatrixProvider>(
    coordinates: &[Coordinate],
    start_location: Option<Coordinate>,
    matrix_provider: &M,
    options: &SolveOptions,
) -> Result<OptimizedRoute, PlanError> {
    let points: Vec<Coordinate> = start_location
        .into_iter()
        .chain(coordinates.iter().copied())
        .collect();

    if points.is_empty() {
        return Err(PlanError::TooFewLocations {
            found: 0,
            required: 1,
        });
    }

    if points.len() == 1 {
        return Ok(OptimizedRoute {
            coordinates: points,
            sequence: RouteSequence::from_indices(vec![0], 0.0, 0.0),
        });
    }

    let matrix = matrix_provider
        .matrix_for(&points)
        .map_err(PlanError::MatrixUnavailable)?;

    if matrix.size() != points.len() {
        warn!(matrix = matrix.size(), points = points.len(), "matrix does not cover every location");
        return Err(PlanError::NoRoute);
    }

    let sequence = sequence(&matrix, options);
    if sequence.is_empty() {
        return Err(PlanError::NoRoute);
    }

    Ok(OptimizedRoute {
        coordinates: sequence.ordered(&points),
        sequence,
    })
}

/// Sum of durations along consecutive pairs of `indices`.
pub fn path_duration(matrix: &DistanceDurationMatrix, indices: &[usize]) -> f64 {
    indices
        .windows(2)
        .map(|pair| matrix.duration(pair[0], pair[1]))
        .sum()
}

/// Sum of distances along consecutive pairs of `indices`.
pub fn path_distance(matrix: &DistanceDurationMatrix, indices: &[usize]) -> f64 {
    indices
        .windows(2)
        .map(|pair| matrix.distance(pair[0], pair[1]))
        .sum()
}

/// Try every ordering of the non-start indices; the first minimum in
/// lexicographic order wins.
fn exact_tour(matrix: &DistanceDurationMatrix, start: usize) -> Vec<usize> {
    let n = matrix.size();
    let rest: Vec<usize> = (0..n).filter(|&i| i != start).collect();

    let mut best: Option<(f64, Vec<usize>)> = None;
    for permutation in rest.iter().copied().permutations(rest.len()) {
        let mut tour = Vec::with_capacity(n + 1);
        tour.push(start);
        tour.extend(permutation);
        tour.push(start);

        let cost = path_duration(matrix, &tour);
        let improves = match &best {
            Some((best_cost, _)) => cost.total_cmp(best_cost).is_lt(),
            None => true,
        };
        if improves {
            best = Some((cost, tour));
        }
    }

    best.map(|(_, tour)| tour).unwrap_or_default()
}

/// Greedy tour: always move to the closest unvisited index (lowest index on
/// ties), then return to the start. Not improved afterwards.
fn nearest_neighbor_tour(matrix: &DistanceDurationMatrix, start: usize) -> Vec<usize> {
    let n = matrix.size();
    let mut visited = vec![false; n];
    visited[start] = true;

    let mut tour = Vec::with_capacity(n + 1);
    tour.push(start);
    let mut current = start;

    loop {
        let nearest = (0..n)
            .filter(|&candidate| !visited[candidate])
            .min_by(|&a, &b| matrix.duration(current, a).total_cmp(&matrix.duration(current, b)));
        let Some(next) = nearest else {
            break;
        };

        visited[next] = true;
        tour.push(next);
        current = next;
    }

    tour.push(start);
    tour
}
