//! Boundary-aware grid planning.
//!
//! The sweep box is split into an `n x n` lattice. A cell survives when
//! any of these hold:
//!
//! 1. its center lies in or on the boundary,
//! 2. any of its four corners lies in or on the boundary,
//! 3. its rectangle intersects the boundary.
//!
//! The point checks are cheap and settle most cells. The rectangle test
//! catches thin slivers of the region that cross a cell without covering
//! any sampled point.

use place_sweep_geography_models::{BoundingBox, GridCell};

use crate::{BoundaryPolygon, GeometryError};

/// Largest accepted cells-per-axis value.
pub const MAX_RESOLUTION: u32 = 4096;

/// Produces every cell of the `resolution x resolution` lattice over
/// `bounds`, row by row from the south-west corner.
///
/// Cell edges are computed as `low + i * step` rather than accumulated, so
/// cache keys are reproducible for identical inputs.
///
/// # Errors
///
/// Returns [`GeometryError`] if the bounds are invalid or the resolution
/// is zero or above [`MAX_RESOLUTION`].
pub fn lattice(bounds: &BoundingBox, resolution: u32) -> Result<Vec<GridCell>, GeometryError> {
    bounds.validate()?;
    let capacity = usize::try_from(resolution)
        .ok()
        .filter(|_| (1..=MAX_RESOLUTION).contains(&resolution))
        .and_then(|n| n.checked_mul(n))
        .ok_or(GeometryError::InvalidResolution(resolution))?;

    let n = f64::from(resolution);
    let lat_step = bounds.lat_span() / n;
    let lon_step = bounds.lon_span() / n;

    let mut cells = Vec::with_capacity(capacity);
    for i in 0..resolution {
        let i = f64::from(i);
        for j in 0..resolution {
            let j = f64::from(j);
            cells.push(GridCell {
                lat_low: (i * lat_step) + bounds.lat_low,
                lon_low: (j * lon_step) + bounds.lon_low,
                lat_high: ((i + 1.0) * lat_step) + bounds.lat_low,
                lon_high: ((j + 1.0) * lon_step) + bounds.lon_low,
            });
        }
    }

    Ok(cells)
}

/// Whether a cell overlaps the boundary by any of the three tests.
#[must_use]
pub fn cell_overlaps(cell: &GridCell, boundary: &BoundaryPolygon) -> bool {
    boundary.contains_or_on(cell.center())
        || cell
            .corners()
            .iter()
            .any(|&corner| boundary.contains_or_on(corner))
        || boundary.intersects_rect(&cell.bounds())
}

/// Returns the cells of the lattice that overlap the boundary, in lattice
/// order.
///
/// # Errors
///
/// Returns [`GeometryError`] if the bounds are invalid or the resolution
/// is out of range.
pub fn plan_cells(
    bounds: &BoundingBox,
    resolution: u32,
    boundary: &BoundaryPolygon,
) -> Result<Vec<GridCell>, GeometryError> {
    let all = lattice(bounds, resolution)?;
    let total = all.len();

    let cells: Vec<GridCell> = all
        .into_iter()
        .filter(|cell| cell_overlaps(cell, boundary))
        .collect();

    log::info!(
        "Generated {} cells overlapping the boundary (out of {total} total grid cells)",
        cells.len()
    );

    Ok(cells)
}
