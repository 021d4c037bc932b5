//! Run-wide tunables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use place_sweep_places::{DetailSettings, RateLimitPolicy, SearchSettings};

use crate::areas::AreaDefinition;

/// Every knob a sweep exposes, with production defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeSettings {
    /// Overrides the area's grid size.
    pub grid_size: Option<u32>,
    /// Grid cells searched at once.
    pub search_concurrency: usize,
    /// Detail lookups in flight at once.
    pub details_concurrency: usize,
    /// Results per search page.
    pub page_size: u32,
    /// Pages fetched per cell.
    pub max_pages: u32,
    /// Wait before each continuation page.
    pub page_delay: Duration,
    /// Wait after each detail lookup.
    pub details_delay: Duration,
    /// Sleep after a rate-limited request.
    pub rate_limit_cooldown: Duration,
    /// Total attempts per unit while rate limited.
    pub max_attempts: u32,
    /// Reviews kept per place.
    pub max_reviews: usize,
    /// Added to the cell diagonal when sizing the search circle.
    pub radius_buffer_m: f64,
    /// Search radius cap.
    pub max_radius_m: u32,
    /// Cache root.
    pub cache_dir: PathBuf,
    /// Output file. Defaults to `<area>_places.json`.
    pub output_path: Option<PathBuf>,
    /// Re-download the boundary even if it is cached.
    pub refresh_boundary: bool,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            grid_size: None,
            search_concurrency: 10,
            details_concurrency: 20,
            page_size: 20,
            max_pages: 3,
            page_delay: Duration::from_secs(2),
            details_delay: Duration::from_millis(100),
            rate_limit_cooldown: Duration::from_secs(30),
            max_attempts: 3,
            max_reviews: 10,
            radius_buffer_m: 100.0,
            max_radius_m: 50_000,
            cache_dir: PathBuf::from("cache"),
            output_path: None,
            refresh_boundary: false,
        }
    }
}

impl ScrapeSettings {
    /// Lattice resolution for `area`.
    #[must_use]
    pub fn grid_size_for(&self, area: &AreaDefinition) -> u32 {
        self.grid_size.unwrap_or(area.grid_size)
    }

    /// Where the final snapshot for `area` is written.
    #[must_use]
    pub fn output_path_for(&self, area: &AreaDefinition) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}_places.json", area.id)))
    }

    /// Where the boundary for `area` is cached.
    #[must_use]
    pub fn boundary_cache_path(&self, area: &AreaDefinition) -> PathBuf {
        boundary_cache_path(&self.cache_dir, &area.id)
    }

    const fn rate_limit(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            cooldown: self.rate_limit_cooldown,
            max_attempts: self.max_attempts,
        }
    }

    /// Search gateway settings for `area`.
    #[must_use]
    pub fn search_settings(&self, area: &AreaDefinition) -> SearchSettings {
        SearchSettings {
            included_types: area.included_types.clone(),
            page_size: self.page_size,
            max_pages: self.max_pages,
            page_delay: self.page_delay,
            radius_buffer_m: self.radius_buffer_m,
            max_radius_m: self.max_radius_m,
            rate_limit: self.rate_limit(),
        }
    }

    /// Detail gateway settings.
    #[must_use]
    pub const fn detail_settings(&self) -> DetailSettings {
        DetailSettings {
            max_reviews: self.max_reviews,
            delay: self.details_delay,
            rate_limit: self.rate_limit(),
        }
    }
}

/// `<cache_dir>/boundaries/<area_id>.json`
#[must_use]
pub fn boundary_cache_path(cache_dir: &Path, area_id: &str) -> PathBuf {
    cache_dir.join("boundaries").join(format!("{area_id}.json"))
}
