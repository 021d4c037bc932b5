//! Bounded-concurrency execution of independent network units.

use std::future::Future;

use place_sweep_places::FetchOutcome;

use crate::progress::ProgressCallback;

/// Drives `units` with at most `limit` in flight, reporting each
/// completion to `progress`.
///
/// Units carry their own failures as values, so one unit failing never
/// cancels the others. Results come back in completion order.
pub async fn run_bounded<I, F, T>(units: I, limit: usize, progress: &dyn ProgressCallback) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T>,
{
    use futures::stream::{self, StreamExt as _};

    stream::iter(units.into_iter().map(move |unit| async move {
        let output = unit.await;
        progress.inc(1);
        output
    }))
    .buffer_unordered(limit.max(1))
    .collect()
    .await
}

/// Outcome tallies for one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseStats {
    /// Units run.
    pub total: usize,
    /// Units answered from the cache.
    pub cache_hits: usize,
    /// Units that reached the provider.
    pub api_calls: usize,
    /// Units abandoned while rate limited.
    pub rate_limited: usize,
    /// Units that failed for other reasons.
    pub failed: usize,
}

impl PhaseStats {
    /// Tallies every outcome in `outcomes`.
    #[must_use]
    pub fn from_outcomes<'a, T: 'a>(outcomes: impl IntoIterator<Item = &'a FetchOutcome<T>>) -> Self {
        let mut stats = Self::default();
        for outcome in outcomes {
            stats.record(outcome);
        }
        stats
    }

    /// Tallies one outcome.
    pub fn record<T>(&mut self, outcome: &FetchOutcome<T>) {
        self.total += 1;
        if outcome.used_api() {
            self.api_calls += 1;
        }
        match outcome {
            FetchOutcome::Cached(_) => self.cache_hits += 1,
            FetchOutcome::Fetched(_) => {}
            FetchOutcome::RateLimited => self.rate_limited += 1,
            FetchOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Units left uncached, to be retried by the next run.
    #[must_use]
    pub const fn incomplete(&self) -> usize {
        self.rate_limited + self.failed
    }

    /// Logs the tallies at info level.
    pub fn log_summary(&self, phase: &str) {
        log::info!(
            "{phase}: {} units, {} cache hits, {} API calls, {} rate limited, {} failed",
            self.total,
            self.cache_hits,
            self.api_calls,
            self.rate_limited,
            self.failed
        );
        if self.incomplete() > 0 {
            log::warn!(
                "{phase}: {} units incomplete, rerun to retry them",
                self.incomplete()
            );
        }
    }
}
