#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for place sweeps.
//!
//! ```text
//! place_sweep [--area manhattan] [--grid-size N] [--search-concurrency K]
//!             [--details-concurrency K] [--cache-dir DIR] [--output FILE]
//!             [--refresh-boundary] [--request-timeout SECS] [--list-areas]
//! ```
//!
//! The API key is read from `GOOGLE_PLACES_API_KEY`. Interrupting a sweep
//! is safe: rerunning it resumes from the cache.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use place_sweep_places::PlacesProvider;
use place_sweep_places::google::GooglePlacesClient;
use place_sweep_scrape::areas::{all_areas, find_area};
use place_sweep_scrape::{ScrapeError, ScrapeSettings};

#[derive(Parser)]
#[command(
    name = "place_sweep",
    about = "Sweep an area's places through a boundary-aware search grid"
)]
struct Cli {
    /// Area to sweep (see --list-areas)
    #[arg(long, default_value = "manhattan")]
    area: String,

    /// Cells per axis, overriding the area's default
    #[arg(long)]
    grid_size: Option<u32>,

    /// Grid cells searched concurrently
    #[arg(long, default_value_t = 10)]
    search_concurrency: usize,

    /// Place detail lookups in flight at once
    #[arg(long, default_value_t = 20)]
    details_concurrency: usize,

    /// Cache root directory
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,

    /// Output file (defaults to `<area>_places.json`)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Re-download the area boundary even if it is cached
    #[arg(long)]
    refresh_boundary: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    request_timeout: u64,

    /// List the available areas and exit
    #[arg(long)]
    list_areas: bool,

    /// Google Places API key
    #[arg(long, env = "GOOGLE_PLACES_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl Cli {
    fn settings(&self) -> ScrapeSettings {
        ScrapeSettings {
            grid_size: self.grid_size,
            search_concurrency: self.search_concurrency,
            details_concurrency: self.details_concurrency,
            cache_dir: self.cache_dir.clone(),
            output_path: self.output.clone(),
            refresh_boundary: self.refresh_boundary,
            ..ScrapeSettings::default()
        }
    }

    fn api_key(&self) -> Result<String, ScrapeError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(String::from)
            .ok_or_else(|| ScrapeError::Config {
                message: "GOOGLE_PLACES_API_KEY is not set".to_string(),
            })
    }
}

/// Shared HTTP client. Stalled requests surface as errors instead of
/// holding a concurrency slot forever.
fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("place_sweep/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = place_sweep_cli_utils::init_logger();
    let cli = Cli::parse();

    if cli.list_areas {
        for area in all_areas() {
            println!("{:<16} {} (grid {})", area.id, area.name, area.grid_size);
        }
        return Ok(());
    }

    let area = find_area(&cli.area).ok_or_else(|| ScrapeError::Config {
        message: format!("Unknown area '{}' (see --list-areas)", cli.area),
    })?;
    let api_key = cli.api_key()?;
    let settings = cli.settings();

    let client = http_client(Duration::from_secs(cli.request_timeout))?;
    let provider: Arc<dyn PlacesProvider> =
        Arc::new(GooglePlacesClient::new(client.clone(), api_key));
    let progress = place_sweep_cli_utils::sweep_progress(&multi);

    let report = place_sweep_scrape::run(&client, &area, &settings, provider, &progress).await?;

    log::info!(
        "Done: {} places from {} cells written to {}",
        report.result.total_count,
        report.cells,
        report.output_path.display()
    );
    if report.search.incomplete() + report.details.incomplete() > 0 {
        log::warn!(
            "{} searches and {} detail lookups are incomplete, rerun to finish them",
            report.search.incomplete(),
            report.details.incomplete()
        );
    }

    Ok(())
}
