//! Error types for collaborator lookups and route planning.

use thiserror::Error;

/// Failure of an external lookup (matrix, directions, weather, geocoding).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("no result")]
    NotFound,
}

/// A route could not be computed at all.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("at least {required} location(s) required, got {found}")]
    TooFewLocations { found: usize, required: usize },
    #[error("distance matrix unavailable: {0}")]
    MatrixUnavailable(#[source] ProviderError),
    #[error("no route could be sequenced")]
    NoRoute,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: String, value: String },
}
