#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Grid sweep orchestration.
//!
//! A sweep tiles an area's bounding box, keeps the cells that touch the
//! area's boundary, searches each cell, deduplicates the results, and
//! enriches every unique place with details. Every network outcome goes
//! through the result cache, so an interrupted sweep resumes by simply
//! running it again.
//!
//! Area definitions live in TOML files under `areas/` (see [`areas`]).

pub mod aggregate;
pub mod areas;
pub mod pipeline;
pub mod progress;
pub mod scheduler;
pub mod settings;

pub use aggregate::RunResult;
pub use pipeline::{SweepReport, run, sweep};
pub use settings::ScrapeSettings;

use place_sweep_boundary::BoundaryError;
use place_sweep_cache::CacheError;
use place_sweep_spatial::GeometryError;
use thiserror::Error;

/// Fatal sweep errors. Per-unit failures never surface here; they are
/// tallied and left uncached for the next run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Missing credentials, unknown area, or another unusable setting.
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong.
        message: String,
    },

    /// The area's bounds or grid parameters are invalid.
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// The area's boundary could not be obtained.
    #[error("Boundary error: {0}")]
    Boundary(#[from] BoundaryError),

    /// The result cache could not be opened.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
