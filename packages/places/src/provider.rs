//! The remote places API seam.

use place_sweep_places_models::{PlaceDetails, SearchNearbyRequest, SearchNearbyResponse};

use crate::PlacesError;

/// A places search/detail backend.
///
/// Implementations must report quota exhaustion as
/// [`PlacesError::RateLimited`] so the gateways can cool down and retry.
#[async_trait::async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Runs one page of a nearby search.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError`] if the request fails or is rate limited.
    async fn search_nearby(
        &self,
        request: &SearchNearbyRequest,
    ) -> Result<SearchNearbyResponse, PlacesError>;

    /// Fetches supplementary details for one place.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError`] if the request fails or is rate limited.
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError>;
}
