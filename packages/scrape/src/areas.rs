//! Area registry: sweep targets loaded from embedded TOML definitions.
//!
//! Each `.toml` file in `packages/scrape/areas/` is baked into the binary
//! via [`include_str!`]. Adding an area means adding a file and listing it
//! below.

use place_sweep_boundary::BoundarySource;
use place_sweep_geography_models::BoundingBox;
use serde::Deserialize;

/// A sweep target.
#[derive(Debug, Clone, Deserialize)]
pub struct AreaDefinition {
    /// Unique identifier used on the command line and in cache paths.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Cells per axis of the search lattice.
    pub grid_size: u32,
    /// Provider category filter.
    #[serde(default = "default_included_types")]
    pub included_types: Vec<String>,
    /// Box the lattice is laid over.
    pub bounds: BoundingBox,
    /// Where the region polygon comes from.
    pub boundary: BoundarySource,
}

fn default_included_types() -> Vec<String> {
    vec!["restaurant".to_string()]
}

const AREA_TOMLS: &[(&str, &str)] = &[("manhattan", include_str!("../areas/manhattan.toml"))];

#[cfg(test)]
const EXPECTED_AREA_COUNT: usize = 1;

/// Returns every registered area.
///
/// # Panics
///
/// Panics if an embedded TOML definition is malformed. The definitions are
/// compiled in, so this surfaces on the first run of the test suite.
#[must_use]
pub fn all_areas() -> Vec<AreaDefinition> {
    AREA_TOMLS
        .iter()
        .map(|(id, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse area definition '{id}': {e}"))
        })
        .collect()
}

/// Looks up an area by ID, case-insensitively.
#[must_use]
pub fn find_area(id: &str) -> Option<AreaDefinition> {
    all_areas()
        .into_iter()
        .find(|area| area.id.eq_ignore_ascii_case(id))
}
