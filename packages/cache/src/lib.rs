#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Durable, existence-aware result cache.
//!
//! Every network outcome is cached, including "fetched and found nothing".
//! A lookup therefore has three answers ([`CacheRecord`]): the key was
//! never fetched, it was fetched and was empty, or it was fetched and has
//! a payload. Only the first one means a paid API call is needed.
//!
//! Each entry is a pretty-printed JSON file named after its key, so
//! concurrent writers never share a file and no locking is required.

pub mod store;

use std::path::{Path, PathBuf};

use strum::{AsRefStr, Display};
use thiserror::Error;

pub use store::JsonStore;

/// Errors from cache writes. Reads never fail: an unreadable entry is
/// reported as [`CacheRecord::Absent`].
#[derive(Debug, Error)]
pub enum CacheError {
    /// A filesystem operation failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The payload could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The state of one cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheRecord<T> {
    /// Never fetched (or the entry was unreadable). Must fetch.
    Absent,
    /// Fetched, confirmed empty. Must not re-fetch.
    Empty,
    /// Fetched with data.
    Present(T),
}

impl<T> CacheRecord<T> {
    /// Whether the key still needs a fetch.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Collapses a cached record to its payload, substituting the default
    /// for [`CacheRecord::Empty`]. Returns `None` only for
    /// [`CacheRecord::Absent`].
    #[must_use]
    pub fn into_cached(self) -> Option<T>
    where
        T: Default,
    {
        match self {
            Self::Absent => None,
            Self::Empty => Some(T::default()),
            Self::Present(value) => Some(value),
        }
    }
}

/// The logical stores kept under the cache root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CacheNamespace {
    /// Search results keyed by grid cell bounds.
    Grid,
    /// Detail records keyed by place ID.
    Details,
}

/// The sweep's result cache: one [`JsonStore`] per [`CacheNamespace`].
#[derive(Debug, Clone)]
pub struct ResultCache {
    root: PathBuf,
    grid: JsonStore,
    details: JsonStore,
}

impl ResultCache {
    /// Opens (or creates) the cache directories under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if a directory cannot be created.
    pub fn open(root: &Path) -> Result<Self, CacheError> {
        Ok(Self {
            root: root.to_path_buf(),
            grid: JsonStore::open(root, CacheNamespace::Grid)?,
            details: JsonStore::open(root, CacheNamespace::Details)?,
        })
    }

    /// Per-cell search results.
    #[must_use]
    pub const fn grid(&self) -> &JsonStore {
        &self.grid
    }

    /// Per-place detail records.
    #[must_use]
    pub const fn details(&self) -> &JsonStore {
        &self.details
    }

    /// The cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}
