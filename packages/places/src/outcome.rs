//! Per-unit fetch results.

/// How one cache-first fetch ended.
///
/// Failures are values, not errors: a unit that fails never aborts the
/// units running beside it.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// Served from the cache with no network call.
    Cached(T),
    /// Fetched from the provider and persisted.
    Fetched(T),
    /// Still rate limited after every retry. Nothing was cached.
    RateLimited,
    /// Failed for another reason. Nothing was cached.
    Failed(String),
}

impl<T> FetchOutcome<T> {
    /// Whether the provider was contacted for this unit.
    #[must_use]
    pub const fn used_api(&self) -> bool {
        !matches!(self, Self::Cached(_))
    }

    /// Whether the unit ended with a value.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Cached(_) | Self::Fetched(_))
    }

    /// The value, if the unit succeeded.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Cached(value) | Self::Fetched(value) => Some(value),
            Self::RateLimited | Self::Failed(_) => None,
        }
    }

    /// Transforms the value, keeping the outcome kind.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        match self {
            Self::Cached(value) => FetchOutcome::Cached(f(value)),
            Self::Fetched(value) => FetchOutcome::Fetched(f(value)),
            Self::RateLimited => FetchOutcome::RateLimited,
            Self::Failed(reason) => FetchOutcome::Failed(reason),
        }
    }

    /// A borrowed view of the value, if the unit succeeded.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Cached(value) | Self::Fetched(value) => Some(value),
            Self::RateLimited | Self::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_is_the_only_api_free_outcome() {
        assert!(!FetchOutcome::Cached(1).used_api());
        assert!(FetchOutcome::Fetched(1).used_api());
        assert!(FetchOutcome::<u8>::RateLimited.used_api());
        assert!(FetchOutcome::<u8>::Failed("boom".to_string()).used_api());
    }

    #[test]
    fn failures_carry_no_value() {
        assert_eq!(FetchOutcome::Fetched(3).into_value(), Some(3));
        assert_eq!(FetchOutcome::<u8>::RateLimited.into_value(), None);
        assert!(!FetchOutcome::<u8>::Failed(String::new()).is_success());
    }
}
