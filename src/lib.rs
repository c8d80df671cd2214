//! courier-route-planner core
//!
//! Sequences delivery stops, assembles per-leg route details with simulated
//! traffic and weather, and decides when a stored route has gone stale.

pub mod traits;
pub mod error;
pub mod solver;
pub mod details;
pub mod staleness;
pub mod traffic;
pub mod format;
pub mod haversine;
pub mod polyline;
pub mod osrm;
pub mod weather;
pub mod nominatim;
pub mod http;
pub mod config;
