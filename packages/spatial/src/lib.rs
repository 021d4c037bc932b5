#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Boundary polygons and boundary-aware grid planning.
//!
//! A [`BoundaryPolygon`] answers two questions: whether a point lies in or
//! on the target region, and whether a rectangle touches it. The
//! [`grid`] module uses both to keep only the lattice cells that overlap
//! the region, so a sweep never pays for area outside it.

pub mod boundary;
pub mod grid;
pub mod parse;

pub use boundary::BoundaryPolygon;
pub use grid::plan_cells;

use place_sweep_geography_models::InvalidBounds;
use thiserror::Error;

/// Errors from polygon construction and grid planning.
///
/// All of these are fatal to a sweep: without a usable boundary the grid
/// cannot be classified.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The sweep bounding box is empty or inverted.
    #[error(transparent)]
    Bounds(#[from] InvalidBounds),

    /// The grid resolution is zero or above [`grid::MAX_RESOLUTION`].
    #[error("Grid resolution must be between 1 and {max} (got {0})", max = grid::MAX_RESOLUTION)]
    InvalidResolution(u32),

    /// The polygon ring is unusable (too few vertices, non-finite values).
    #[error("Invalid polygon: {message}")]
    InvalidPolygon {
        /// Description of what is wrong with the ring.
        message: String,
    },
}
