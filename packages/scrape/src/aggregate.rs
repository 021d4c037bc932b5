//! Deduplication, enrichment, and the final snapshot.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use place_sweep_places::DetailGateway;
use place_sweep_places_models::Place;
use serde::{Deserialize, Serialize};

use crate::ScrapeError;
use crate::progress::ProgressCallback;
use crate::scheduler::{PhaseStats, run_bounded};

/// Merges per-cell results into one map keyed by place ID.
///
/// Overlapping search circles return the same place from several cells;
/// the last copy seen wins. Places without a website are skipped even if
/// an older cache entry still holds them.
#[must_use]
pub fn merge<I>(results: I) -> BTreeMap<String, Place>
where
    I: IntoIterator<Item = Vec<Place>>,
{
    let mut places = BTreeMap::new();
    let mut seen = 0_usize;

    for place in results.into_iter().flatten() {
        seen += 1;
        if !place.has_website() {
            continue;
        }
        places.insert(place.id.clone(), place);
    }

    log::info!(
        "Merged {seen} results into {} unique places",
        places.len()
    );

    places
}

/// Fetches details for every place, at most `limit` at a time, merging
/// them into the map in place.
///
/// Each unit owns exactly one entry of the map. Places whose details could
/// not be fetched keep their search data.
pub async fn enrich(
    places: &mut BTreeMap<String, Place>,
    gateway: &DetailGateway,
    limit: usize,
    progress: &dyn ProgressCallback,
) -> PhaseStats {
    let outcomes = run_bounded(
        places.values_mut().map(move |place| async move {
            let outcome = gateway.details(&place.id).await;
            outcome.map(|details| place.apply_details(details))
        }),
        limit,
        progress,
    )
    .await;

    PhaseStats::from_outcomes(&outcomes)
}

/// The sweep's output artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Number of places in [`Self::places`].
    pub total_count: usize,
    /// When the snapshot was assembled.
    pub scraped_at: DateTime<Utc>,
    /// Every unique place, ordered by ID.
    #[serde(rename = "restaurants")]
    pub places: Vec<Place>,
}

impl RunResult {
    /// Builds a snapshot stamped with the current time.
    #[must_use]
    pub fn new(places: BTreeMap<String, Place>) -> Self {
        let places: Vec<Place> = places.into_values().collect();
        Self {
            total_count: places.len(),
            scraped_at: Utc::now(),
            places,
        }
    }
}

/// Writes `result` as pretty JSON, replacing `path` atomically.
///
/// # Errors
///
/// Returns [`ScrapeError`] if serialization or any filesystem step fails.
pub async fn write_output(path: &Path, result: &RunResult) -> Result<(), ScrapeError> {
    use tokio::io::AsyncWriteExt as _;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let bytes = serde_json::to_vec_pretty(result)?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&tmp, path).await?;

    log::info!(
        "Saved {} places to {}",
        result.total_count,
        path.display()
    );
    Ok(())
}
