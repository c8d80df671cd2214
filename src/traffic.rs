//! Simulated traffic conditions.
//!
//! Stands in for a live traffic feed: a level 0-3 composed from the local
//! hour, the day of week, the segment length and a random jitter. The jitter
//! source is injectable so callers can seed it or pin it.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::haversine::haversine_km;
use crate::traits::Coordinate;

/// Fraction of the base duration added as delay, indexed by traffic level.
pub const DELAY_FACTORS: [f64; 4] = [0.0, 0.15, 0.30, 0.60];

/// Segments longer than this bias the level upward.
const LONG_SEGMENT_KM: f64 = 10.0;

/// Segments shorter than this bias the level downward.
const SHORT_SEGMENT_KM: f64 = 1.0;

/// Jitter steps and their weights, skewed toward positive steps.
const JITTER_STEPS: [(i32, u32); 4] = [(-1, 15), (0, 30), (1, 40), (2, 15)];

/// Traffic level: 0 free flowing, 1 light, 2 moderate, 3 heavy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TrafficLevel(u8);

impl TrafficLevel {
    pub const FREE: TrafficLevel = TrafficLevel(0);
    pub const LIGHT: TrafficLevel = TrafficLevel(1);
    pub const MODERATE: TrafficLevel = TrafficLevel(2);
    pub const HEAVY: TrafficLevel = TrafficLevel(3);

    /// Clamp an arbitrary score into 0..=3.
    pub fn clamped(score: i32) -> Self {
        TrafficLevel(score.clamp(0, 3) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn delay_factor(self) -> f64 {
        DELAY_FACTORS[self.0 as usize]
    }

    pub fn color(self) -> TrafficColor {
        match self.0 {
            0 => TrafficColor::Green,
            1 => TrafficColor::Yellow,
            2 => TrafficColor::Orange,
            _ => TrafficColor::Red,
        }
    }
}

impl TryFrom<u8> for TrafficLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= 3 {
            Ok(TrafficLevel(value))
        } else {
            Err(format!("traffic level {} out of range 0-3", value))
        }
    }
}

impl From<TrafficLevel> for u8 {
    fn from(level: TrafficLevel) -> Self {
        level.0
    }
}

/// Display color for a segment. `Gray` marks legs that could not be routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficColor {
    Green,
    Yellow,
    Orange,
    Red,
    Gray,
}

impl TrafficColor {
    pub fn as_str(self) -> &'static str {
        match self {
            TrafficColor::Green => "green",
            TrafficColor::Yellow => "yellow",
            TrafficColor::Orange => "orange",
            TrafficColor::Red => "red",
            TrafficColor::Gray => "gray",
        }
    }
}

/// Source of the random level adjustment.
pub trait Jitter {
    fn draw(&mut self) -> i32;
}

/// Weighted random jitter over [`JITTER_STEPS`].
#[derive(Debug, Clone)]
pub struct WeightedJitter<R> {
    rng: R,
}

impl<R: Rng> WeightedJitter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Jitter for WeightedJitter<R> {
    fn draw(&mut self) -> i32 {
        JITTER_STEPS
            .choose_weighted(&mut self.rng, |step| step.1)
            .map(|step| step.0)
            .unwrap_or(0)
    }
}

/// Always returns the same adjustment.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedJitter(pub i32);

impl Jitter for FixedJitter {
    fn draw(&mut self) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct TrafficSimulator<J> {
    jitter: J,
}

impl TrafficSimulator<WeightedJitter<StdRng>> {
    /// Reproducible simulator for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(WeightedJitter::new(StdRng::seed_from_u64(seed)))
    }

    pub fn from_entropy() -> Self {
        Self::new(WeightedJitter::new(StdRng::from_entropy()))
    }
}

impl<J: Jitter> TrafficSimulator<J> {
    pub fn new(jitter: J) -> Self {
        Self { jitter }
    }

    /// Level for a segment of `length_km` travelled at local time `at`.
    pub fn level(&mut self, at: NaiveDateTime, length_km: f64) -> TrafficLevel {
        let base = base_level(at.hour(), at.weekday());
        let score = base + length_adjustment(length_km) + self.jitter.draw();
        TrafficLevel::clamped(score)
    }

    /// Level for the straight-line segment between two coordinates.
    pub fn level_between(&mut self, from: Coordinate, to: Coordinate, at: NaiveDateTime) -> TrafficLevel {
        self.level(at, haversine_km(from, to))
    }
}

/// Hour-of-day base level, one step lower on weekends (floored at 0).
pub fn base_level(hour: u32, weekday: Weekday) -> i32 {
    let base = match hour {
        7..=9 | 16..=19 => 2,
        10..=15 | 20..=23 => 1,
        _ => 0,
    };
    if matches!(weekday, Weekday::Sat | Weekday::Sun) {
        (base - 1).max(0)
    } else {
        base
    }
}

pub fn length_adjustment(length_km: f64) -> i32 {
    if length_km > LONG_SEGMENT_KM {
        1
    } else if length_km < SHORT_SEGMENT_KM {
        -1
    } else {
        0
    }
}
