//! On-disk boundary cache.
//!
//! Stores the exterior ring as `{"coordinates": [[lon, lat], ...],
//! "source": "<url>"}`.

use std::path::Path;

use place_sweep_spatial::BoundaryPolygon;
use serde::{Deserialize, Serialize};

use crate::BoundaryError;

#[derive(Debug, Serialize, Deserialize)]
struct CachedBoundary {
    coordinates: Vec<[f64; 2]>,
    #[serde(default)]
    source: Option<String>,
}

/// Reads a cached boundary. A missing file yields `Ok(None)`.
///
/// # Errors
///
/// Returns [`BoundaryError`] if the file exists but cannot be read or does
/// not hold a valid ring.
pub async fn read(path: &Path) -> Result<Option<BoundaryPolygon>, BoundaryError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let cached: CachedBoundary = serde_json::from_slice(&bytes)?;
    Ok(Some(BoundaryPolygon::from_ring(&cached.coordinates)?))
}

/// Writes the boundary ring, creating parent directories as needed.
///
/// The ring goes to a sibling temp file that is synced and renamed over
/// `path`, so readers never see a partial file.
///
/// # Errors
///
/// Returns [`BoundaryError`] if serialization or the write fails.
pub async fn write(
    path: &Path,
    boundary: &BoundaryPolygon,
    source: &str,
) -> Result<(), BoundaryError> {
    use tokio::io::AsyncWriteExt as _;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let cached = CachedBoundary {
        coordinates: boundary.ring(),
        source: Some(source.to_string()),
    };
    let bytes = serde_json::to_vec_pretty(&cached)?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
