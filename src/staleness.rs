//! Staleness evaluation for previously assembled routes.
//!
//! Re-assembles a stored route against fresh traffic and decides whether the
//! segment durations moved enough to replace it.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::details::{AssembleOptions, RouteAssembler, RouteDetail, Segment};
use crate::traffic::Jitter;
use crate::traits::{Coordinate, DirectionsProvider, WeatherProvider};

/// Records older than this are always re-assembled.
pub const STALE_AFTER_SECS: i64 = 600;

/// Default percentage change in a segment duration that triggers an update.
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 15.0;

/// Duration comparison for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationChange {
    pub segment: usize,
    pub old_duration: f64,
    pub new_duration: f64,
    pub change_percent: f64,
    pub increased: bool,
}

/// Whether a stored route should be replaced, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateDecision {
    pub needs_update: bool,
    pub reason: String,
    pub max_change_percent: f64,
    pub changed_segment: Option<usize>,
    pub duration_changes: Vec<DurationChange>,
    /// Present only when `needs_update` is set.
    pub new_route: Option<RouteDetail>,
}

impl UpdateDecision {
    fn keep(reason: impl Into<String>) -> Self {
        Self {
            needs_update: false,
            reason: reason.into(),
            max_change_percent: 0.0,
            changed_segment: None,
            duration_changes: Vec::new(),
            new_route: None,
        }
    }
}

/// Compare `stored` against a fresh assembly of `coordinates`.
///
/// The fresh assembly reuses the stored record's traffic and tour settings.
/// A threshold of zero or less requests an update even when no segment
/// changed; `changed_segment` is then `None`.
pub fn evaluate<D, W, J>(
    stored: &RouteDetail,
    coordinates: &[Coordinate],
    threshold_percent: f64,
    assembler: &mut RouteAssembler<'_, D, W, J>,
    now: DateTime<Local>,
) -> UpdateDecision
where
    D: DirectionsProvider + Sync,
    W: WeatherProvider + Sync,
    J: Jitter,
{
    if coordinates.is_empty() {
        return UpdateDecision::keep("No coordinates available to check for updates");
    }

    let options = AssembleOptions {
        include_traffic: stored.has_traffic_data,
        closed_tour: stored.closed_tour,
        ..AssembleOptions::default()
    };

    let outdated = match stored.timestamp {
        Some(timestamp) => now.timestamp() - timestamp > STALE_AFTER_SECS,
        None => true,
    };
    if outdated {
        info!("stored route is outdated, re-assembling");
        return UpdateDecision {
            needs_update: true,
            reason: "Route information is outdated".to_string(),
            max_change_percent: 0.0,
            changed_segment: None,
            duration_changes: Vec::new(),
            new_route: Some(assembler.assemble(coordinates, &options, now)),
        };
    }

    let fresh = assembler.assemble(coordinates, &options, now);
    let duration_changes = compare_segments(&stored.segments, &fresh.segments);

    let mut max_change_percent = 0.0;
    let mut changed_segment = None;
    for change in &duration_changes {
        if change.change_percent > max_change_percent {
            max_change_percent = change.change_percent;
            changed_segment = Some(change.segment);
        }
    }

    let needs_update = max_change_percent >= threshold_percent;
    debug!(max_change_percent, threshold_percent, needs_update, "compared segment durations");

    let changed_segment = changed_segment.filter(|_| needs_update);
    let reason = match changed_segment {
        Some(index) => describe_change(index, &stored.segments[index], &fresh.segments[index]),
        None if needs_update => format!("Update threshold of {}% reached", threshold_percent),
        None => "No significant traffic changes".to_string(),
    };
    if needs_update {
        info!(%reason, "route needs update");
    }

    UpdateDecision {
        needs_update,
        reason,
        max_change_percent,
        changed_segment,
        duration_changes,
        new_route: needs_update.then_some(fresh),
    }
}

/// Index-by-index duration changes. Segments with a zero stored duration are skipped.
fn compare_segments(old: &[Segment], new: &[Segment]) -> Vec<DurationChange> {
    old.iter()
        .zip(new)
        .enumerate()
        .filter(|(_, (old, _))| old.duration != 0.0)
        .map(|(segment, (old, new))| DurationChange {
            segment,
            old_duration: old.duration,
            new_duration: new.duration,
            change_percent: (new.duration - old.duration).abs() / old.duration * 100.0,
            increased: new.duration > old.duration,
        })
        .collect()
}

fn describe_change(index: usize, old: &Segment, new: &Segment) -> String {
    let destination = old
        .weather
        .as_ref()
        .or(new.weather.as_ref())
        .map(|weather| weather.location_name.clone())
        .unwrap_or_else(|| format!("point {}", index + 2));

    let diff_minutes = (new.duration / 60.0) as i64 - (old.duration / 60.0) as i64;
    if new.duration > old.duration {
        format!("Traffic increased on the route to {} (+{} min)", destination, diff_minutes)
    } else {
        format!("Traffic decreased on the route to {} ({} min)", destination, diff_minutes)
    }
}
