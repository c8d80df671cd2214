//! Segment detail assembly.
//!
//! Turns an ordered coordinate sequence into a [`RouteDetail`]: one routed
//! [`Segment`] per consecutive pair, enriched with simulated traffic and
//! destination weather, plus aggregated totals. A leg whose directions lookup
//! fails degrades to a straight line on its own; it never fails the route.

use chrono::{DateTime, Local};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::format::{format_delay, format_duration, round_to};
use crate::haversine::haversine_km;
use crate::polyline::Polyline;
use crate::traffic::{Jitter, TrafficColor, TrafficLevel, TrafficSimulator};
use crate::traits::{Coordinate, DirectionsProvider, Instruction, RouteLeg, WeatherProvider, WeatherSnapshot};

#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Add simulated traffic delay to segment durations.
    pub include_traffic: bool,
    /// The last coordinate returns to the first; its leg skips the weather lookup.
    pub closed_tour: bool,
    /// Issue per-leg lookups on the rayon pool.
    pub parallel_lookups: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            include_traffic: true,
            closed_tour: false,
            parallel_lookups: true,
        }
    }
}

/// One traversal leg between consecutive coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start_idx: usize,
    pub end_idx: usize,
    /// Kilometers.
    pub distance: f64,
    /// Seconds including traffic delay.
    pub duration: f64,
    /// Seconds without traffic.
    pub base_duration: f64,
    /// Seconds of delay due to traffic.
    pub traffic_delay: f64,
    pub traffic_level: TrafficLevel,
    pub traffic_color: TrafficColor,
    pub geometry: Polyline,
    pub instructions: Vec<Instruction>,
    pub weather: Option<WeatherSnapshot>,
}

impl Segment {
    /// Straight-line stand-in for a leg that could not be routed.
    fn fallback(index: usize, from: Coordinate, to: Coordinate) -> Self {
        Self {
            start_idx: index,
            end_idx: index + 1,
            distance: haversine_km(from, to),
            duration: 0.0,
            base_duration: 0.0,
            traffic_delay: 0.0,
            traffic_level: TrafficLevel::FREE,
            traffic_color: TrafficColor::Gray,
            geometry: Polyline::straight(from, to),
            instructions: Vec::new(),
            weather: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.traffic_color == TrafficColor::Gray
    }
}

/// Traffic summary for one routed segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficCondition {
    pub segment: usize,
    pub level: TrafficLevel,
    pub color: TrafficColor,
    pub delay_seconds: f64,
}

/// A fully assembled route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDetail {
    pub segments: Vec<Segment>,
    /// Kilometers, rounded to two decimals.
    pub total_distance: f64,
    /// `"{h}h {m}m"`.
    pub total_duration: String,
    pub total_duration_seconds: f64,
    pub base_duration_seconds: f64,
    pub traffic_delay_seconds: f64,
    pub traffic_delay_text: String,
    pub traffic_conditions: Vec<TrafficCondition>,
    pub has_traffic_data: bool,
    #[serde(default)]
    pub closed_tour: bool,
    /// Unix seconds when the route was assembled.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl RouteDetail {
    fn from_segments(
        segments: Vec<Segment>,
        traffic_conditions: Vec<TrafficCondition>,
        options: &AssembleOptions,
        now: DateTime<Local>,
    ) -> Self {
        let total_distance: f64 = segments.iter().map(|s| s.distance).sum();
        let total_duration: f64 = segments.iter().map(|s| s.duration).sum();
        let traffic_delay: f64 = segments.iter().map(|s| s.traffic_delay).sum();

        Self {
            segments,
            total_distance: round_to(total_distance, 2),
            total_duration: format_duration(total_duration),
            total_duration_seconds: total_duration,
            base_duration_seconds: total_duration - traffic_delay,
            traffic_delay_seconds: traffic_delay,
            traffic_delay_text: format_delay(traffic_delay),
            traffic_conditions,
            has_traffic_data: options.include_traffic,
            closed_tour: options.closed_tour,
            timestamp: Some(now.timestamp()),
        }
    }
}

/// Result of the external lookups for one leg.
struct LegLookup {
    route: Result<RouteLeg, ProviderError>,
    weather: Option<WeatherSnapshot>,
}

/// Assembles [`RouteDetail`]s from injected directions and weather providers.
pub struct RouteAssembler<'a, D, W, J> {
    directions: &'a D,
    weather: &'a W,
    traffic: TrafficSimulator<J>,
}

impl<'a, D, W, J> RouteAssembler<'a, D, W, J>
where
    D: DirectionsProvider + Sync,
    W: WeatherProvider + Sync,
    J: Jitter,
{
    pub fn new(directions: &'a D, weather: &'a W, traffic: TrafficSimulator<J>) -> Self {
        Self {
            directions,
            weather,
            traffic,
        }
    }

    /// Assemble segment details for `coordinates` in the given order.
    ///
    /// Fewer than two coordinates yield a detail with no segments.
    pub fn assemble(
        &mut self,
        coordinates: &[Coordinate],
        options: &AssembleOptions,
        now: DateTime<Local>,
    ) -> RouteDetail {
        let leg_count = coordinates.len().saturating_sub(1);
        debug!(legs = leg_count, "assembling route details");

        let lookups = self.lookup_legs(coordinates, options);

        let at = now.naive_local();
        let mut segments = Vec::with_capacity(leg_count);
        let mut conditions = Vec::with_capacity(leg_count);

        for (index, lookup) in lookups.into_iter().enumerate() {
            let from = coordinates[index];
            let to = coordinates[index + 1];

            let leg = match lookup.route {
                Ok(leg) => leg,
                Err(err) => {
                    warn!(segment = index, error = %err, "directions failed, using straight line");
                    segments.push(Segment::fallback(index, from, to));
                    continue;
                }
            };

            let level = self.traffic.level(at, leg.distance_km);
            let delay = if options.include_traffic {
                leg.base_duration_seconds * level.delay_factor()
            } else {
                0.0
            };

            conditions.push(TrafficCondition {
                segment: index,
                level,
                color: level.color(),
                delay_seconds: delay,
            });
            segments.push(Segment {
                start_idx: index,
                end_idx: index + 1,
                distance: leg.distance_km,
                duration: leg.base_duration_seconds + delay,
                base_duration: leg.base_duration_seconds,
                traffic_delay: delay,
                traffic_level: level,
                traffic_color: level.color(),
                geometry: leg.geometry,
                instructions: leg.instructions,
                weather: lookup.weather,
            });
        }

        RouteDetail::from_segments(segments, conditions, options, now)
    }

    /// Directions and weather for every leg, in leg order.
    fn lookup_legs(&self, coordinates: &[Coordinate], options: &AssembleOptions) -> Vec<LegLookup> {
        let leg_count = coordinates.len().saturating_sub(1);
        let directions = self.directions;
        let weather = self.weather;
        let closed_tour = options.closed_tour;

        let lookup = |index: usize| {
            let from = coordinates[index];
            let to = coordinates[index + 1];
            let route = directions.route_leg(from, to);
            let closing_leg = closed_tour && index + 1 == leg_count;
            let weather = if route.is_ok() && !closing_leg {
                weather.weather_at(to)
            } else {
                None
            };
            LegLookup { route, weather }
        };

        if options.parallel_lookups {
            (0..leg_count).into_par_iter().map(lookup).collect()
        } else {
            (0..leg_count).map(lookup).collect()
        }
    }
}
