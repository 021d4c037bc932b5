//! Fixed inter-request delays and rate-limit cooldowns.
//!
//! Pacing is independent of concurrency: a delay is paid by the unit that
//! made the call and does not block its siblings.

use std::future::Future;
use std::time::Duration;

use crate::PlacesError;

/// A fixed delay paid after a network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pacing {
    /// How long to wait.
    pub delay: Duration,
}

impl Pacing {
    /// Creates a pacing policy with the given delay.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Waits out the delay. A zero delay returns immediately.
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Cooldown-and-retry policy for [`PlacesError::RateLimited`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Sleep after each rate-limited attempt.
    pub cooldown: Duration,
    /// Total attempts per unit, including the first.
    pub max_attempts: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(30),
            max_attempts: 3,
        }
    }
}

impl RateLimitPolicy {
    /// Runs `attempt` until it succeeds, fails with something other than a
    /// rate limit, or the attempts run out. Returns the last result.
    ///
    /// # Errors
    ///
    /// Returns the final [`PlacesError`] when no attempt succeeded.
    pub async fn run<T, F, Fut>(&self, label: &str, mut attempt: F) -> Result<T, PlacesError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, PlacesError>> + Send,
    {
        let attempts = self.max_attempts.max(1);
        let mut n = 1;

        loop {
            match attempt().await {
                Err(PlacesError::RateLimited) if n < attempts => {
                    log::warn!(
                        "Rate limited on {label} (attempt {n}/{attempts}), cooling down for {}s",
                        self.cooldown.as_secs()
                    );
                    tokio::time::sleep(self.cooldown).await;
                    n += 1;
                }
                result => return result,
            }
        }
    }
}
