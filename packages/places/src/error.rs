use thiserror::Error;

/// Errors from a places provider call.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// The provider's quota is exhausted (HTTP 429 or
    /// `RESOURCE_EXHAUSTED`). Retryable after a cooldown.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider error message.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the decoding failure.
        message: String,
    },
}

impl PlacesError {
    /// Whether this is a quota signal rather than a hard failure.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}
