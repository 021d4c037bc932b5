#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Places provider access for the sweep.
//!
//! The [`PlacesProvider`] trait abstracts the remote search/detail API;
//! [`google::GooglePlacesClient`] implements it against the Google Places
//! v1 REST API. On top of the provider sit two cache-first gateways:
//!
//! - [`SearchGateway`]: one paginated nearby search per grid cell.
//! - [`DetailGateway`]: one detail lookup per unique place.
//!
//! Both consult the [`place_sweep_cache`] store before touching the
//! network, persist every completed fetch (including empty ones), and
//! report per-unit [`FetchOutcome`]s instead of propagating errors.

pub mod details;
pub mod error;
pub mod google;
pub mod outcome;
pub mod pacing;
pub mod provider;
pub mod search;

pub use details::{DetailGateway, DetailSettings};
pub use error::PlacesError;
pub use outcome::FetchOutcome;
pub use pacing::{Pacing, RateLimitPolicy};
pub use provider::PlacesProvider;
pub use search::{SearchGateway, SearchSettings};
