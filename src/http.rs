//! Blocking request helper shared by the HTTP adapters.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{RequestBuilder, Response};
use tracing::warn;

use crate::error::ProviderError;

/// Bounded retry on HTTP 429 with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on every further attempt.
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Backoff after the zero-based failed `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

/// Send the request built by `build`, retrying while the server answers 429.
///
/// Any other non-success status is returned as [`ProviderError::Status`].
pub(crate) fn send_with_retry<F>(policy: &RetryPolicy, mut build: F) -> Result<Response, ProviderError>
where
    F: FnMut() -> RequestBuilder,
{
    let attempts = policy.max_attempts.max(1);
    for attempt in 0..attempts {
        let response = build().send()?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            if attempt + 1 < attempts {
                let delay = policy.delay_for(attempt);
                warn!(attempt, ?delay, "rate limited, backing off");
                std::thread::sleep(delay);
                continue;
            }
            break;
        }

        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }
        return Ok(response);
    }

    Err(ProviderError::RateLimited { attempts })
}
