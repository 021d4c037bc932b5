//! `GeoJSON` `FeatureCollection` download with mirror fallback.

use crate::BoundaryError;

/// Fetches all features from a direct `GeoJSON` URL.
///
/// # Errors
///
/// Returns [`BoundaryError`] if the request fails or the response is not
/// a feature collection.
pub async fn fetch_features(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<serde_json::Value>, BoundaryError> {
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(BoundaryError::Format {
            message: format!("GeoJSON request failed with status {}", resp.status()),
        });
    }
    let body = resp.text().await?;

    let json: serde_json::Value = serde_json::from_str(&body)?;
    parse_feature_collection(&json)
}

/// Extracts the `features` array from a `FeatureCollection`.
///
/// # Errors
///
/// Returns [`BoundaryError::Format`] if `json` is not a feature
/// collection.
pub fn parse_feature_collection(
    json: &serde_json::Value,
) -> Result<Vec<serde_json::Value>, BoundaryError> {
    if json["type"].as_str() != Some("FeatureCollection") {
        return Err(BoundaryError::Format {
            message: "expected a GeoJSON FeatureCollection".to_string(),
        });
    }

    json["features"]
        .as_array()
        .cloned()
        .ok_or_else(|| BoundaryError::Format {
            message: "No features array in GeoJSON response".to_string(),
        })
}

/// Tries each URL in order and returns the first successful download
/// along with the URL that produced it.
///
/// # Errors
///
/// Returns [`BoundaryError::Unavailable`] if every URL fails.
pub async fn fetch_first_available(
    client: &reqwest::Client,
    urls: &[String],
) -> Result<(String, Vec<serde_json::Value>), BoundaryError> {
    let mut failures = Vec::new();

    for url in urls {
        log::info!("Downloading boundary data from {url}...");
        match fetch_features(client, url).await {
            Ok(features) => return Ok((url.clone(), features)),
            Err(e) => {
                log::warn!("Boundary download from {url} failed: {e}");
                failures.push(format!("{url}: {e}"));
            }
        }
    }

    Err(BoundaryError::Unavailable {
        message: if failures.is_empty() {
            "no boundary URLs configured".to_string()
        } else {
            failures.join("; ")
        },
    })
}
