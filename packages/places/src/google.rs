//! Google Places API (v1) client.
//!
//! See <https://developers.google.com/maps/documentation/places/web-service/nearby-search>

use place_sweep_places_models::{PlaceDetails, SearchNearbyRequest, SearchNearbyResponse};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{PlacesError, PlacesProvider};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://places.googleapis.com/v1";

/// Fields requested from nearby search.
pub const SEARCH_FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,\
places.location,places.types,places.rating,places.userRatingCount,places.priceLevel,\
places.websiteUri,places.nationalPhoneNumber,places.businessStatus,places.reviewSummary,\
nextPageToken";

/// Fields requested from place details.
pub const DETAILS_FIELD_MASK: &str = "id,displayName,reviews,generativeSummary,reviewSummary";

const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

/// Places API client authenticated with an API key.
pub struct GooglePlacesClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GooglePlacesClient {
    /// Creates a client against [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Creates a client against a custom API root (e.g. a proxy).
    #[must_use]
    pub fn with_base_url(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        field_mask: &str,
    ) -> Result<T, PlacesError> {
        let resp = request
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", field_mask)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        decode(&body)
    }
}

#[async_trait::async_trait]
impl PlacesProvider for GooglePlacesClient {
    async fn search_nearby(
        &self,
        request: &SearchNearbyRequest,
    ) -> Result<SearchNearbyResponse, PlacesError> {
        let url = format!("{}/places:searchNearby", self.base_url);
        self.send(self.client.post(url).json(request), SEARCH_FIELD_MASK)
            .await
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let id = place_id.strip_prefix("places/").unwrap_or(place_id);
        let url = format!("{}/places/{id}", self.base_url);
        self.send(self.client.get(url), DETAILS_FIELD_MASK).await
    }
}

/// Google API error envelope.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Maps a non-success response to a [`PlacesError`].
fn classify_error(status: reqwest::StatusCode, body: &str) -> PlacesError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || body.contains(RESOURCE_EXHAUSTED) {
        return PlacesError::RateLimited;
    }

    let message = serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| format!("HTTP {status}: {body}"),
        |envelope| {
            if envelope.error.status.is_empty() {
                envelope.error.message
            } else {
                format!("{}: {}", envelope.error.status, envelope.error.message)
            }
        },
    );

    PlacesError::Api {
        status: status.as_u16(),
        message,
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, PlacesError> {
    // An empty search result comes back as `{}`.
    let body = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(body).map_err(|e| PlacesError::Parse {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_is_rate_limited() {
        let err = classify_error(reqwest::StatusCode::TOO_MANY_REQUESTS, "");
        assert!(err.is_rate_limited());
    }

    #[test]
    fn resource_exhausted_body_is_rate_limited() {
        let body = r#"{"error": {"code": 403, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = classify_error(reqwest::StatusCode::FORBIDDEN, body);
        assert!(err.is_rate_limited());
    }

    #[test]
    fn other_failures_keep_status_and_message() {
        let body = r#"{"error": {"code": 400, "message": "Invalid radius", "status": "INVALID_ARGUMENT"}}"#;
        match classify_error(reqwest::StatusCode::BAD_REQUEST, body) {
            PlacesError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "INVALID_ARGUMENT: Invalid radius");
            }
            other => panic!("unexpected error: {other}"),
        }

        match classify_error(reqwest::StatusCode::BAD_GATEWAY, "<html>") {
            PlacesError::Api { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("<html>"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decodes_empty_search_response() {
        let response: SearchNearbyResponse = decode("{}").unwrap();
        assert!(response.places.is_empty());
        assert!(response.next_page_token.is_none());

        let response: SearchNearbyResponse = decode("").unwrap();
        assert!(response.places.is_empty());
    }

    #[test]
    fn decodes_search_page() {
        let body = r#"{
            "places": [{
                "id": "ChIJ1",
                "displayName": {"text": "Corner Cafe", "languageCode": "en"},
                "location": {"latitude": 40.75, "longitude": -73.99},
                "types": ["restaurant", "cafe"],
                "rating": 4.4,
                "userRatingCount": 312,
                "priceLevel": "PRICE_LEVEL_MODERATE",
                "websiteUri": "https://corner.example"
            }],
            "nextPageToken": "next"
        }"#;
        let response: SearchNearbyResponse = decode(body).unwrap();
        assert_eq!(response.places.len(), 1);
        assert_eq!(response.places[0].user_rating_count, Some(312));
        assert_eq!(response.next_page_token.as_deref(), Some("next"));
    }

    #[test]
    fn decodes_details_with_reviews() {
        let body = r#"{
            "id": "ChIJ1",
            "displayName": {"text": "Corner Cafe"},
            "reviews": [{
                "rating": 5,
                "text": {"text": "Great", "languageCode": "en"},
                "authorAttribution": {"displayName": "Sam"},
                "publishTime": "2024-03-01T12:00:00Z"
            }],
            "generativeSummary": {"overview": {"text": "Neighborhood cafe"}}
        }"#;
        let details: PlaceDetails = decode(body).unwrap();
        assert_eq!(details.reviews.len(), 1);
        assert!(details.reviews[0].publish_time.is_some());
        assert!(!details.is_empty());
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        let result: Result<SearchNearbyResponse, _> = decode("{\"places\": 3}");
        assert!(matches!(result, Err(PlacesError::Parse { .. })));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = GooglePlacesClient::with_base_url(
            reqwest::Client::new(),
            "key".to_string(),
            "http://localhost:8080/v1/".to_string(),
        );
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }
}
