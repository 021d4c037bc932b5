#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region boundary acquisition.
//!
//! Downloads a `GeoJSON` `FeatureCollection` from one of several mirrors,
//! picks out the feature for the target region, and caches its exterior
//! ring on disk so later runs skip the download entirely. A sweep cannot
//! start without a boundary, so every failure here is fatal to the run.

pub mod cache;
pub mod extract;
pub mod fetch;

use std::path::Path;

use place_sweep_geography_models::BoundingBox;
use place_sweep_spatial::{BoundaryPolygon, GeometryError};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while acquiring a boundary.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the cached boundary failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The extracted polygon is unusable.
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// A download returned something other than a feature collection.
    #[error("Unexpected boundary data: {message}")]
    Format {
        /// Description of what was wrong with the payload.
        message: String,
    },

    /// No mirror produced a matching feature.
    #[error("Boundary unavailable: {message}")]
    Unavailable {
        /// Summary of what was tried.
        message: String,
    },
}

/// Where and how to find a region's boundary, as declared in an area
/// definition.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundarySource {
    /// `GeoJSON` `FeatureCollection` URLs, tried in order.
    pub urls: Vec<String>,
    /// Feature properties that may hold the region name.
    #[serde(default)]
    pub name_properties: Vec<String>,
    /// Accepted region names, compared case-insensitively.
    #[serde(default)]
    pub names: Vec<String>,
    /// Feature properties that may hold the region code.
    #[serde(default)]
    pub code_properties: Vec<String>,
    /// Accepted region code.
    #[serde(default)]
    pub code: Option<i64>,
    /// Fallback when nothing matches by name or code: the first polygon
    /// whose centroid falls inside this box.
    #[serde(default)]
    pub centroid_bounds: Option<BoundingBox>,
}

/// Loads the boundary, preferring the on-disk cache at `cache_path`.
///
/// With `force_download` the cache is ignored and overwritten.
///
/// # Errors
///
/// Returns [`BoundaryError::Unavailable`] if no mirror yields a matching
/// feature, or another [`BoundaryError`] if the extracted polygon is
/// invalid or cannot be cached.
pub async fn load_boundary(
    client: &reqwest::Client,
    source: &BoundarySource,
    cache_path: &Path,
    force_download: bool,
) -> Result<BoundaryPolygon, BoundaryError> {
    if !force_download {
        match cache::read(cache_path).await {
            Ok(Some(polygon)) => {
                log::info!(
                    "Loaded cached boundary from {} ({} points)",
                    cache_path.display(),
                    polygon.vertex_count()
                );
                return Ok(polygon);
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable boundary cache {}: {e}",
                    cache_path.display()
                );
            }
        }
    }

    let (url, features) = fetch::fetch_first_available(client, &source.urls).await?;

    let polygon = extract::select_polygon(&features, source).ok_or_else(|| {
        BoundaryError::Unavailable {
            message: format!("no matching feature among {} from {url}", features.len()),
        }
    })?;
    let boundary = BoundaryPolygon::new(polygon)?;

    cache::write(cache_path, &boundary, &url).await?;
    log::info!(
        "Loaded boundary from {url} ({} points)",
        boundary.vertex_count()
    );

    Ok(boundary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_deserializes_with_defaults() {
        let source: BoundarySource = serde_json::from_value(serde_json::json!({
            "urls": ["https://example.invalid/a.geojson"]
        }))
        .unwrap();
        assert_eq!(source.urls.len(), 1);
        assert!(source.names.is_empty());
        assert!(source.code.is_none());
        assert!(source.centroid_bounds.is_none());
    }

    #[tokio::test]
    async fn cached_boundary_skips_the_network() {
        let dir = std::env::temp_dir().join("place_sweep_boundary_test_cached");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("area.json");

        let square =
            BoundaryPolygon::from_ring(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
                .unwrap();
        cache::write(&path, &square, "test").await.unwrap();

        // No URLs at all: any download attempt would fail.
        let source = BoundarySource {
            urls: vec![],
            name_properties: vec![],
            names: vec![],
            code_properties: vec![],
            code: None,
            centroid_bounds: None,
        };
        let loaded = load_boundary(&reqwest::Client::new(), &source, &path, false)
            .await
            .unwrap();
        assert_eq!(loaded.ring(), square.ring());

        let forced = load_boundary(&reqwest::Client::new(), &source, &path, true).await;
        assert!(matches!(forced, Err(BoundaryError::Unavailable { .. })));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
