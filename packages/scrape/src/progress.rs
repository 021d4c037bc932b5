//! Progress reporting for sweep phases.
//!
//! [`ProgressCallback`] keeps the orchestration free of any rendering
//! backend. The CLI plugs in `indicatif` bars; tests use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from a long-running phase.
///
/// Implementations must be `Send + Sync` because units report completion
/// from whichever task finishes them.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of units in the phase.
    fn set_total(&self, total: u64);

    /// Advances by `delta` completed units.
    fn inc(&self, delta: u64);

    /// Updates the label shown beside the indicator.
    fn set_message(&self, msg: String);

    /// Marks the phase complete with a closing message.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

/// One progress indicator per network phase.
#[derive(Clone)]
pub struct SweepProgress {
    /// Grid cell searches.
    pub search: Arc<dyn ProgressCallback>,
    /// Per-place detail lookups.
    pub details: Arc<dyn ProgressCallback>,
}

impl SweepProgress {
    /// Progress that reports nowhere.
    #[must_use]
    pub fn silent() -> Self {
        Self {
            search: null_progress(),
            details: null_progress(),
        }
    }
}
