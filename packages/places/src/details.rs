//! Cache-first detail lookups per place.

use std::sync::Arc;
use std::time::Duration;

use place_sweep_cache::{CacheRecord, JsonStore};
use place_sweep_places_models::PlaceDetails;

use crate::{FetchOutcome, Pacing, PlacesError, PlacesProvider, RateLimitPolicy};

/// Tunables for [`DetailGateway`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailSettings {
    /// Reviews kept per place, newest first.
    pub max_reviews: usize,
    /// Wait after every detail request.
    pub delay: Duration,
    /// Rate-limit handling.
    pub rate_limit: RateLimitPolicy,
}

impl Default for DetailSettings {
    fn default() -> Self {
        Self {
            max_reviews: 10,
            delay: Duration::from_millis(100),
            rate_limit: RateLimitPolicy::default(),
        }
    }
}

/// Fetches place details, backed by the details cache namespace.
pub struct DetailGateway {
    provider: Arc<dyn PlacesProvider>,
    cache: JsonStore,
    settings: DetailSettings,
}

impl DetailGateway {
    /// Creates a gateway over `cache` (the details namespace).
    #[must_use]
    pub fn new(provider: Arc<dyn PlacesProvider>, cache: JsonStore, settings: DetailSettings) -> Self {
        Self {
            provider,
            cache,
            settings,
        }
    }

    /// Returns the details for `place_id`, trimmed to the most recent
    /// reviews.
    pub async fn details(&self, place_id: &str) -> FetchOutcome<PlaceDetails> {
        match self.cache.get::<PlaceDetails>(place_id).await {
            CacheRecord::Present(details) => return FetchOutcome::Cached(details),
            CacheRecord::Empty => return FetchOutcome::Cached(PlaceDetails::default()),
            CacheRecord::Absent => {}
        }

        let label = format!("place {place_id}");
        let provider = &self.provider;
        let pacing = Pacing::new(self.settings.delay);

        let result = self
            .settings
            .rate_limit
            .run(&label, move || async move {
                let result = provider.place_details(place_id).await;
                pacing.pause().await;
                result
            })
            .await;

        let mut details = match result {
            Ok(details) => details,
            Err(PlacesError::RateLimited) => {
                log::warn!("Giving up on {label} after repeated rate limiting");
                return FetchOutcome::RateLimited;
            }
            Err(e) => {
                log::warn!("Details failed for {label}: {e}");
                return FetchOutcome::Failed(e.to_string());
            }
        };

        details.keep_latest_reviews(self.settings.max_reviews);

        let stored = if details.is_empty() {
            self.cache.put_empty(place_id).await
        } else {
            self.cache.put_present(place_id, &details).await
        };

        if let Err(e) = stored {
            log::warn!("Failed to cache {label}: {e}");
            return FetchOutcome::Failed(e.to_string());
        }

        FetchOutcome::Fetched(details)
    }
}
