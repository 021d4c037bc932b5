#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place records and places-provider request/response types.
//!
//! Field names follow the provider's JSON (`camelCase`). Every optional
//! provider field decodes to `None` or an empty list when missing, so the
//! rest of the pipeline never has to probe for field presence.

use chrono::{DateTime, Utc};
use place_sweep_geography_models::LatLng;
use serde::{Deserialize, Serialize};

/// Text with an optional BCP-47 language code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    /// The text itself.
    #[serde(default)]
    pub text: String,
    /// Language of the text (e.g. `"en"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// Provider-generated summary of a place's reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    /// Summary text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<LocalizedText>,
    /// Link to the full review listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews_uri: Option<String>,
    /// Attribution/disclosure required alongside the summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclosure_text: Option<LocalizedText>,
}

/// Provider-generated description of a place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerativeSummary {
    /// Short overview.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<LocalizedText>,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedText>,
}

impl GenerativeSummary {
    /// Whether neither the overview nor the description is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.overview.is_none() && self.description.is_none()
    }
}

/// Who wrote a review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorAttribution {
    /// Author display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Author profile link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Author photo link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_uri: Option<String>,
}

/// A single user review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Star rating, 1 to 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Review body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<LocalizedText>,
    /// Review author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_attribution: Option<AuthorAttribution>,
    /// When the review was published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<DateTime<Utc>>,
}

/// Supplementary per-place data from the detail endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetails {
    /// Most recent reviews, newest first once truncated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<Review>,
    /// Generated overview/description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generative_summary: Option<GenerativeSummary>,
    /// Generated review summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_summary: Option<ReviewSummary>,
}

impl PlaceDetails {
    /// Whether the response carried nothing worth caching as a payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
            && self
                .generative_summary
                .as_ref()
                .is_none_or(GenerativeSummary::is_empty)
            && self.review_summary.is_none()
    }

    /// Keeps the `max` most recent reviews, newest first. Reviews without a
    /// publish time sort last.
    pub fn keep_latest_reviews(&mut self, max: usize) {
        self.reviews
            .sort_by(|a, b| b.publish_time.cmp(&a.publish_time));
        self.reviews.truncate(max);
    }
}

/// A discovered place, keyed by the provider-assigned `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Provider-assigned stable identifier.
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<LocalizedText>,
    /// Full street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    /// Coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
    /// Provider category tags (e.g. `"restaurant"`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    /// Average rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Number of ratings behind [`Self::rating`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating_count: Option<u32>,
    /// Price tier (e.g. `"PRICE_LEVEL_MODERATE"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<String>,
    /// Website.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_uri: Option<String>,
    /// Phone number in national format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_phone_number: Option<String>,
    /// Operational status (e.g. `"OPERATIONAL"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_status: Option<String>,
    /// Generated review summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_summary: Option<ReviewSummary>,
    /// Reviews, filled in by enrichment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<Review>,
    /// Generated overview/description, filled in by enrichment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generative_summary: Option<GenerativeSummary>,
}

impl Place {
    /// The website, if present and non-blank.
    #[must_use]
    pub fn website(&self) -> Option<&str> {
        self.website_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
    }

    /// Whether the place has a usable website. Places without one are
    /// dropped before caching.
    #[must_use]
    pub fn has_website(&self) -> bool {
        self.website().is_some()
    }

    /// Merges enrichment fields into this place. Fields the details do not
    /// carry are left untouched.
    pub fn apply_details(&mut self, details: PlaceDetails) {
        if !details.reviews.is_empty() {
            self.reviews = details.reviews;
        }
        if let Some(summary) = details.generative_summary {
            self.generative_summary = Some(summary);
        }
        if let Some(summary) = details.review_summary {
            self.review_summary = Some(summary);
        }
    }
}

/// Circular search area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    /// Circle center.
    pub center: LatLng,
    /// Radius in meters.
    pub radius: f64,
}

/// Restricts a nearby search to a circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRestriction {
    /// The search circle.
    pub circle: Circle,
}

/// One page request of a nearby search.
///
/// The first page carries the location and type filters; later pages
/// carry only the continuation token returned by the previous page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchNearbyRequest {
    /// Category filter (e.g. `["restaurant"]`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_types: Vec<String>,
    /// Page size cap.
    pub max_result_count: u32,
    /// Search circle, first page only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_restriction: Option<LocationRestriction>,
    /// Continuation token, later pages only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl SearchNearbyRequest {
    /// Builds the first-page request for a circle.
    #[must_use]
    pub fn first_page(
        center: LatLng,
        radius_meters: u32,
        included_types: &[String],
        page_size: u32,
    ) -> Self {
        Self {
            included_types: included_types.to_vec(),
            max_result_count: page_size,
            location_restriction: Some(LocationRestriction {
                circle: Circle {
                    center,
                    radius: f64::from(radius_meters),
                },
            }),
            page_token: None,
        }
    }

    /// Builds a continuation request.
    #[must_use]
    pub const fn next_page(page_token: String, page_size: u32) -> Self {
        Self {
            included_types: Vec::new(),
            max_result_count: page_size,
            location_restriction: None,
            page_token: Some(page_token),
        }
    }
}

/// One page of nearby-search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchNearbyResponse {
    /// Places on this page.
    #[serde(default)]
    pub places: Vec<Place>,
    /// Token for the next page, if there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}
