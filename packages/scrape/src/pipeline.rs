//! End-to-end sweep: boundary, grid, search, merge, enrich, write.

use std::path::PathBuf;
use std::sync::Arc;

use place_sweep_boundary::load_boundary;
use place_sweep_cache::ResultCache;
use place_sweep_places::{DetailGateway, FetchOutcome, PlacesProvider, SearchGateway};
use place_sweep_spatial::{BoundaryPolygon, GeometryError, plan_cells};

use crate::ScrapeError;
use crate::aggregate::{RunResult, enrich, merge, write_output};
use crate::areas::AreaDefinition;
use crate::progress::SweepProgress;
use crate::scheduler::{PhaseStats, run_bounded};
use crate::settings::ScrapeSettings;

/// What a completed sweep did.
#[derive(Debug, Clone)]
pub struct SweepReport {
    /// Grid cells overlapping the boundary.
    pub cells: usize,
    /// Search phase tallies.
    pub search: PhaseStats,
    /// Cells fetched this run whose results may have been truncated.
    pub saturated_cells: usize,
    /// Detail phase tallies.
    pub details: PhaseStats,
    /// The snapshot that was written.
    pub result: RunResult,
    /// Where it was written.
    pub output_path: PathBuf,
}

/// Loads the area's boundary, then runs [`sweep`].
///
/// # Errors
///
/// Returns [`ScrapeError`] if the bounds are invalid, the boundary cannot
/// be obtained, the cache cannot be opened, or the output cannot be
/// written.
pub async fn run(
    client: &reqwest::Client,
    area: &AreaDefinition,
    settings: &ScrapeSettings,
    provider: Arc<dyn PlacesProvider>,
    progress: &SweepProgress,
) -> Result<SweepReport, ScrapeError> {
    area.bounds.validate().map_err(GeometryError::from)?;

    log::info!("Loading boundary for {}...", area.name);
    let boundary = load_boundary(
        client,
        &area.boundary,
        &settings.boundary_cache_path(area),
        settings.refresh_boundary,
    )
    .await?;

    sweep(area, &boundary, settings, provider, progress).await
}

/// Sweeps `area` inside `boundary` and writes the snapshot.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the grid cannot be planned, the cache cannot
/// be opened, or the output cannot be written.
pub async fn sweep(
    area: &AreaDefinition,
    boundary: &BoundaryPolygon,
    settings: &ScrapeSettings,
    provider: Arc<dyn PlacesProvider>,
    progress: &SweepProgress,
) -> Result<SweepReport, ScrapeError> {
    let grid_size = settings.grid_size_for(area);
    let cells = plan_cells(&area.bounds, grid_size, boundary)?;
    let cache = ResultCache::open(&settings.cache_dir)?;

    let search = SearchGateway::new(
        provider.clone(),
        cache.grid().clone(),
        settings.search_settings(area),
    );

    log::info!(
        "Searching {} cells of a {grid_size}x{grid_size} grid (concurrency={})...",
        cells.len(),
        settings.search_concurrency
    );
    progress.search.set_message("Searching grid cells".to_string());
    progress.search.set_total(cells.len() as u64);

    let outcomes = run_bounded(
        cells.iter().map(|cell| search.search(cell)),
        settings.search_concurrency,
        progress.search.as_ref(),
    )
    .await;

    let search_stats = PhaseStats::from_outcomes(&outcomes);
    progress
        .search
        .finish(format!("Searched {} cells", search_stats.total));
    search_stats.log_summary("Search");

    let saturated_cells = search.saturated_cells();
    if saturated_cells > 0 {
        log::warn!(
            "{saturated_cells} cells hit the {}-result ceiling, consider a finer grid",
            search.settings().result_ceiling()
        );
    }

    let mut places = merge(outcomes.into_iter().filter_map(FetchOutcome::into_value));

    let details = DetailGateway::new(
        provider,
        cache.details().clone(),
        settings.detail_settings(),
    );

    log::info!(
        "Fetching details for {} places (concurrency={})...",
        places.len(),
        settings.details_concurrency
    );
    progress.details.set_message("Fetching place details".to_string());
    progress.details.set_total(places.len() as u64);

    let details_stats = enrich(
        &mut places,
        &details,
        settings.details_concurrency,
        progress.details.as_ref(),
    )
    .await;

    progress
        .details
        .finish(format!("Enriched {} places", details_stats.total));
    details_stats.log_summary("Details");

    let result = RunResult::new(places);
    let output_path = settings.output_path_for(area);
    write_output(&output_path, &result).await?;

    Ok(SweepReport {
        cells: cells.len(),
        search: search_stats,
        saturated_cells,
        details: details_stats,
        result,
        output_path,
    })
}
